//! Field Storage - ordered field rows of a form
//!
//! Keys are `<form ulid>/<field ulid>`; listing sorts by `sort_order`.

use crate::error::FormError;
use crate::types::{FieldRecord, FormId};
use redb::TableDefinition;

use super::{form_prefix, prefixed_keys, prefixed_values, scoped_key, Storage};

pub(crate) const FIELDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("form_fields");

impl Storage {
    /// Replace every field of a form in a single transaction.
    ///
    /// Existing rows are deleted, then `fields` are inserted as given.
    pub fn replace_fields(&self, form_id: &FormId, fields: &[FieldRecord]) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(FIELDS_TABLE)?;
            for key in prefixed_keys(&table, &form_prefix(form_id))? {
                table.remove(key.as_str())?;
            }
            for field in fields {
                let key = scoped_key(form_id, &field.id.to_string_repr());
                let data = serde_json::to_vec(field)?;
                table.insert(key.as_str(), data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fields of a form ordered by `sort_order`
    pub fn list_fields(&self, form_id: &FormId) -> Result<Vec<FieldRecord>, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(FIELDS_TABLE)?;

        let mut fields = prefixed_values(&table, &form_prefix(form_id))?
            .iter()
            .map(|data| serde_json::from_slice::<FieldRecord>(data))
            .collect::<Result<Vec<_>, _>>()?;
        fields.sort_by_key(|f| f.sort_order);
        Ok(fields)
    }
}
