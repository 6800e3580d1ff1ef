use tracing::{info, warn};
use uuid::Uuid;

use crate::ai_client::AiService;
use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow, ResumeStatus};
use crate::resumes::store::ResumeStore;
use crate::storage::{self, ObjectStore, StoredObject, Upload, PROCESSING_URL_TTL};

/// Stores an uploaded resume, records it, and runs AI extraction on it.
///
/// Exactly one record exists afterwards when this returns `Ok`, and its status is
/// `completed` or `failed`. Extraction failure is not an error here: the record
/// carries the outcome. Validation or storage failure returns before any record
/// is created.
pub async fn ingest_resume(
    resumes: &dyn ResumeStore,
    object_store: &dyn ObjectStore,
    ai: &dyn AiService,
    owner: Uuid,
    upload: Upload,
) -> Result<ResumeRow, AppError> {
    let object = storage::store_upload(object_store, &upload).await?;

    let record = match resumes
        .create(NewResume {
            user_id: owner,
            file_name: object.key.clone(),
            file_path: object.reference.clone(),
            original_name: upload.original_name.clone(),
            mime_type: upload.mime_type.clone(),
            status: ResumeStatus::Processing,
        })
        .await
    {
        Ok(record) => record,
        Err(e) => {
            release_object(object_store, &object.key).await;
            return Err(e);
        }
    };

    info!(
        "Resume {} stored as {} for user {owner}; extracting",
        record.id, object.key
    );

    match extract(object_store, ai, &object).await {
        Ok(extracted) => {
            let parsed = extracted
                .parsed
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| AppError::Internal(e.into()))?;
            match resumes
                .record_outcome(
                    record.id,
                    ResumeStatus::Completed,
                    Some(extracted.raw_text),
                    parsed,
                )
                .await
            {
                Ok(completed) => {
                    info!("Resume {} extraction completed", completed.id);
                    Ok(completed)
                }
                Err(e) => {
                    warn!("Resume {} could not be marked completed: {e}", record.id);
                    // Leave the record failed rather than processing if the store still accepts writes.
                    if let Err(fallback) = resumes
                        .record_outcome(record.id, ResumeStatus::Failed, None, None)
                        .await
                    {
                        warn!("Resume {} could not be marked failed: {fallback}", record.id);
                    }
                    Err(e)
                }
            }
        }
        Err(reason) => {
            warn!("Resume {} extraction failed: {reason}", record.id);
            resumes
                .record_outcome(record.id, ResumeStatus::Failed, None, None)
                .await
        }
    }
}

async fn extract(
    object_store: &dyn ObjectStore,
    ai: &dyn AiService,
    object: &StoredObject,
) -> Result<crate::ai_client::ExtractedResume, String> {
    let reference = object_store
        .processing_reference(object, PROCESSING_URL_TTL)
        .await
        .map_err(|e| format!("could not build processing reference: {e}"))?;
    ai.extract_resume(&reference)
        .await
        .map_err(|e| e.to_string())
}

/// Best-effort removal of a stored object; failures are logged only.
pub async fn release_object(object_store: &dyn ObjectStore, key: &str) {
    if let Err(e) = object_store.delete(key).await {
        warn!("Failed to delete stored object {key}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    use crate::ai_client::{AiError, ExtractedResume, ParsedData};
    use crate::testing::{InMemoryObjectStore, InMemoryResumeStore, ScriptedAi};

    fn pdf_upload(name: &str, size: usize) -> Upload {
        Upload {
            field_name: "resume".to_string(),
            original_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::from(vec![b'%'; size]),
        }
    }

    #[tokio::test]
    async fn test_successful_upload_completes_with_raw_text() {
        let resumes = InMemoryResumeStore::default();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default().with_extraction(Ok(ExtractedResume {
            raw_text: "Jane Doe, Rust engineer".to_string(),
            parsed: Some(ParsedData {
                skills: vec!["Rust".to_string()],
                ..Default::default()
            }),
        }));
        let owner = Uuid::new_v4();

        let record = ingest_resume(&resumes, &objects, &ai, owner, pdf_upload("resume.pdf", 1_000_000))
            .await
            .unwrap();

        assert_eq!(record.status(), Some(ResumeStatus::Completed));
        assert_eq!(record.raw_text.as_deref(), Some("Jane Doe, Rust engineer"));
        assert_eq!(record.parsed_data.as_ref().unwrap()["skills"], json!(["Rust"]));
        assert_eq!(record.user_id, owner);
        assert_eq!(record.original_name, "resume.pdf");
        assert!(record.file_name.starts_with("resume-") && record.file_name.ends_with(".pdf"));

        assert_eq!(resumes.len(), 1);
        assert_eq!(objects.keys(), vec![record.file_name.clone()]);
        // The record went through `processing` before extraction resolved.
        assert_eq!(
            resumes.status_history(record.id),
            vec![ResumeStatus::Processing, ResumeStatus::Completed]
        );
        // The AI service was handed the processing reference for the stored object.
        assert_eq!(ai.extraction_refs(), vec![format!("memory://{}", record.file_name)]);
    }

    #[tokio::test]
    async fn test_ai_failure_marks_record_failed_without_erroring() {
        let resumes = InMemoryResumeStore::default();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default()
            .with_extraction(Err(AiError::ConnectionRefused("connection refused".into())));

        let record = ingest_resume(
            &resumes,
            &objects,
            &ai,
            Uuid::new_v4(),
            pdf_upload("resume.pdf", 10),
        )
        .await
        .unwrap();

        assert_eq!(record.status(), Some(ResumeStatus::Failed));
        assert!(record.raw_text.is_none());
        assert_eq!(resumes.len(), 1);
        assert_eq!(objects.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_disallowed_type_creates_nothing() {
        let resumes = InMemoryResumeStore::default();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default();
        let upload = Upload {
            field_name: "resume".to_string(),
            original_name: "resume.exe".to_string(),
            mime_type: "application/x-msdownload".to_string(),
            bytes: Bytes::from_static(b"MZ"),
        };

        let err = ingest_resume(&resumes, &objects, &ai, Uuid::new_v4(), upload)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(resumes.len(), 0);
        assert!(objects.keys().is_empty());
        assert!(ai.extraction_refs().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_creates_nothing() {
        let resumes = InMemoryResumeStore::default();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default();

        let err = ingest_resume(
            &resumes,
            &objects,
            &ai,
            Uuid::new_v4(),
            pdf_upload("resume.pdf", storage::MAX_UPLOAD_BYTES + 1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(resumes.len(), 0);
        assert!(objects.keys().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_creates_no_record() {
        let resumes = InMemoryResumeStore::default();
        let objects = InMemoryObjectStore::failing_writes();
        let ai = ScriptedAi::default();

        let err = ingest_resume(
            &resumes,
            &objects,
            &ai,
            Uuid::new_v4(),
            pdf_upload("resume.pdf", 10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(resumes.len(), 0);
    }

    #[tokio::test]
    async fn test_completion_write_failure_falls_back_to_failed() {
        let resumes = InMemoryResumeStore::failing_completions();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default().with_extraction(Ok(ExtractedResume {
            raw_text: "Jane Doe, Rust engineer".to_string(),
            parsed: None,
        }));

        let err = ingest_resume(
            &resumes,
            &objects,
            &ai,
            Uuid::new_v4(),
            pdf_upload("resume.pdf", 10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        let records = resumes.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status(), Some(ResumeStatus::Failed));
        assert_eq!(
            resumes.status_history(records[0].id),
            vec![ResumeStatus::Processing, ResumeStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_record_failure_releases_stored_object() {
        let resumes = InMemoryResumeStore::failing_creates();
        let objects = InMemoryObjectStore::default();
        let ai = ScriptedAi::default();

        let result = ingest_resume(
            &resumes,
            &objects,
            &ai,
            Uuid::new_v4(),
            pdf_upload("resume.pdf", 10),
        )
        .await;

        assert!(result.is_err());
        assert!(objects.keys().is_empty());
    }
}
