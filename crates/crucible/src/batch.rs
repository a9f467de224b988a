//! Batch transpilation over a source tree.
//!
//! Every first-level subdirectory of the source root names an output
//! language; each file inside is transpiled to that language (input
//! language derived from its extension) and written to the mirrored path
//! under the output root with the output language appended as an extra
//! extension. One file failing does not stop the batch.

use std::path::Path;

use crucible_core::{Hub, HubError, TranspileRequest};

/// Outcome counts of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Transpile every file under `src_dir` into `out_dir`.
pub async fn run(hub: &Hub, src_dir: &Path, out_dir: &Path) -> Result<BatchSummary, HubError> {
    let mut summary = BatchSummary::default();
    std::fs::create_dir_all(out_dir)?;

    for entry in std::fs::read_dir(src_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let output_language = entry.file_name().to_string_lossy().into_owned();
        let lang_out_dir = out_dir.join(&output_language);
        std::fs::create_dir_all(&lang_out_dir)?;

        for file in std::fs::read_dir(entry.path())? {
            let file = file?;
            if !file.file_type()?.is_file() {
                continue;
            }

            let path = file.path();
            let mut request = TranspileRequest::new(&output_language);
            request.location = Some(path.to_string_lossy().into_owned());

            match hub.transpile(request).await {
                Ok(result) => {
                    let mut name = file.file_name().to_string_lossy().into_owned();
                    name.push('.');
                    name.push_str(&output_language);
                    std::fs::write(lang_out_dir.join(&name), &result.text)?;

                    tracing::info!(
                        file = %path.display(),
                        output = %output_language,
                        "transpiled"
                    );
                    summary.succeeded += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        file = %path.display(),
                        output = %output_language,
                        error = %error,
                        "transpile failed"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    Ok(summary)
}
