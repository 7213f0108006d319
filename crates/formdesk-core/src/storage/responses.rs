//! Response Storage - insert-only response rows
//!
//! Keys are `<form ulid>/<response ulid>`, so a prefix scan returns a form's
//! responses in submission order.

use crate::error::FormError;
use crate::types::{FormId, ResponseRecord};
use redb::TableDefinition;

use super::{form_prefix, prefixed_keys, prefixed_values, scoped_key, Storage};

pub(crate) const RESPONSES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("responses");

impl Storage {
    /// Store a response. Responses are never updated.
    pub fn insert_response(&self, response: &ResponseRecord) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(RESPONSES_TABLE)?;
            let key = scoped_key(&response.form_id, &response.id.to_string_repr());
            let data = serde_json::to_vec(response)?;
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Responses to a form, newest first
    pub fn list_responses(&self, form_id: &FormId) -> Result<Vec<ResponseRecord>, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(RESPONSES_TABLE)?;

        let mut responses = prefixed_values(&table, &form_prefix(form_id))?
            .iter()
            .map(|data| serde_json::from_slice::<ResponseRecord>(data))
            .collect::<Result<Vec<_>, _>>()?;
        responses.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(responses)
    }

    pub fn count_responses(&self, form_id: &FormId) -> Result<usize, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(RESPONSES_TABLE)?;
        Ok(prefixed_keys(&table, &form_prefix(form_id))?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Answers;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_responses_newest_first() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.redb")).unwrap();
        let form_id = FormId::new();

        let mut older = ResponseRecord::new(form_id, Answers::new(), Some("old@x.io".into()));
        older.submitted_at = Utc::now() - Duration::hours(2);
        let newer = ResponseRecord::new(form_id, Answers::new(), Some("new@x.io".into()));
        storage.insert_response(&newer).unwrap();
        storage.insert_response(&older).unwrap();

        let listed = storage.list_responses(&form_id).unwrap();
        assert_eq!(listed[0].respondent_email.as_deref(), Some("new@x.io"));
        assert_eq!(listed[1].respondent_email.as_deref(), Some("old@x.io"));
    }

    #[test]
    fn test_count_responses() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.redb")).unwrap();
        let form_id = FormId::new();
        let other = FormId::new();

        for _ in 0..3 {
            storage
                .insert_response(&ResponseRecord::new(form_id, Answers::new(), None))
                .unwrap();
        }
        storage
            .insert_response(&ResponseRecord::new(other, Answers::new(), None))
            .unwrap();

        assert_eq!(storage.count_responses(&form_id).unwrap(), 3);
        assert_eq!(storage.count_responses(&other).unwrap(), 1);
        assert_eq!(storage.count_responses(&FormId::new()).unwrap(), 0);
    }
}
