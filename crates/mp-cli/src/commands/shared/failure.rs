use serde::Serialize;

use mp_status::StatusError;

/// Machine-readable form of an engine failure.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub error: &'static str,
    pub entity: Option<String>,
    pub id: Option<String>,
    pub message: String,
}

impl FailureReport {
    /// `None` unless the chain carries a [`StatusError`].
    pub fn from_anyhow(error: &anyhow::Error) -> Option<Self> {
        let status = error.downcast_ref::<StatusError>()?;
        let entity = match status {
            StatusError::NotFound { entity, .. } => Some(entity.as_str().to_string()),
            _ => None,
        };
        Some(Self {
            error: status.kind(),
            entity,
            id: status.entity_id().map(String::from),
            message: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use mp_core::enums::EntityType;
    use mp_status::StatusError;
    use pretty_assertions::assert_eq;

    use super::FailureReport;

    #[test]
    fn not_found_names_entity_and_id() {
        let error = anyhow::Error::from(StatusError::not_found(EntityType::Task, "tsk-9"));
        let report = FailureReport::from_anyhow(&error).expect("status error");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "error": "not_found",
                "entity": "task",
                "id": "tsk-9",
                "message": "task not found: tsk-9",
            })
        );
    }

    #[test]
    fn validation_survives_added_context() {
        let error = anyhow::Error::from(StatusError::Validation("unknown status 'Done'".into()))
            .context("task status failed");
        let report = FailureReport::from_anyhow(&error).expect("status error");
        assert_eq!(report.error, "validation");
        assert!(report.entity.is_none());
    }

    #[test]
    fn other_errors_have_no_report() {
        let error = anyhow::anyhow!("config broke");
        assert!(FailureReport::from_anyhow(&error).is_none());
    }
}
