use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::body::Bytes;
use axum::Json;

use crate::analysis::{analyze, AnalysisResult};
use crate::error::AnalyzeError;

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "midi_file";

/// `POST /`: analyze one uploaded MIDI file
pub async fn analyze_midi(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AnalyzeError> {
    let result = match multipart {
        Ok(multipart) => handle_upload(multipart).await,
        Err(rejection) => Err(AnalyzeError::from(rejection)),
    };

    match &result {
        Ok(analysis) => log::info!(
            "analyzed '{}': {:.2} BPM, {:.2}s, {} instrument(s), {} tempo change(s)",
            analysis.filename,
            analysis.tempo,
            analysis.duration,
            analysis.instruments,
            analysis.tempo_changes.len()
        ),
        Err(err) => log::warn!("rejected upload: {}", err),
    }

    result.map(Json)
}

async fn handle_upload(multipart: Multipart) -> Result<AnalysisResult, AnalyzeError> {
    let (filename, bytes) = read_upload(multipart).await?;

    // The buffer is complete, so parsing never waits on the network
    tokio::task::spawn_blocking(move || analyze(filename, &bytes))
        .await
        .map_err(|err| AnalyzeError::unexpected(format!("analysis task failed: {}", err)))?
}

/// Read the first `midi_file` field fully into memory
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), AnalyzeError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok((filename, bytes));
    }

    Err(AnalyzeError::unexpected(format!(
        "missing '{}' file field in multipart form",
        UPLOAD_FIELD
    )))
}
