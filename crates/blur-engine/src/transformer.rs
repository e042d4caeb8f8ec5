use blur_core::{Row, RowUpdate, TransformSpec};
use blur_generate::{GeneratorCache, ModifierChain};

use crate::errors::EngineError;

/// Builds the update record for a single source row.
///
/// The update holds the key columns copied verbatim and one freshly generated
/// value per configured column, then passes through the table's modifiers.
/// No other column of the source row is carried over.
pub struct RowTransformer<'a> {
    table: &'a str,
    keys: &'a [String],
    columns: &'a [(String, TransformSpec)],
    modifiers: &'a ModifierChain,
}

impl<'a> RowTransformer<'a> {
    pub fn new(
        table: &'a str,
        keys: &'a [String],
        columns: &'a [(String, TransformSpec)],
        modifiers: &'a ModifierChain,
    ) -> Self {
        Self {
            table,
            keys,
            columns,
            modifiers,
        }
    }

    pub fn transform(
        &self,
        cache: &mut GeneratorCache<'_>,
        record: &Row,
    ) -> Result<RowUpdate, EngineError> {
        let mut update = RowUpdate::new();

        for key in self.keys {
            let value = record
                .get(key)
                .ok_or_else(|| EngineError::MissingKeyColumn {
                    table: self.table.to_string(),
                    column: key.clone(),
                })?;
            update.insert(key.clone(), value.clone());
        }

        for (column, spec) in self.columns {
            let value = cache.generate(spec)?;
            update.insert(column.clone(), value);
        }

        Ok(self.modifiers.apply(update, self.keys)?)
    }
}
