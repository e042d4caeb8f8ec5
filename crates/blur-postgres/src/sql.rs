//! SQL text builders. Every identifier is double-quoted; values are always
//! bound as parameters.

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

fn column_list(columns: &[&String]) -> String {
    columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn count_sql(schema: &str, table: &str) -> String {
    format!("SELECT count(*) FROM {}", qualified(schema, table))
}

pub fn delete_sql(schema: &str, table: &str) -> String {
    format!("DELETE FROM {}", qualified(schema, table))
}

fn key_order(alias: &str, keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("{alias}.{}", quote_ident(key)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_match(left: &str, right: &str, keys: &[String]) -> String {
    keys.iter()
        .map(|key| {
            let quoted = quote_ident(key);
            format!("{left}.{quoted} = {right}.{quoted}")
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// First chunk: `$1` is the row limit.
pub fn first_chunk_sql(schema: &str, table: &str, keys: &[String]) -> String {
    format!(
        "SELECT row_to_json(t.*) FROM {} t ORDER BY {} LIMIT $1",
        qualified(schema, table),
        key_order("t", keys)
    )
}

/// Following chunks: `$1` is a JSON object holding the key values of the
/// last row read, `$2` the row limit. The cursor is converted back to the
/// columns' own types through the table's row type and compared as a tuple.
pub fn next_chunk_sql(schema: &str, table: &str, keys: &[String]) -> String {
    let relation = qualified(schema, table);
    let order = key_order("t", keys);
    let cursor = key_order("c", keys);
    format!(
        "SELECT row_to_json(t.*) FROM {relation} t, \
         jsonb_populate_record(NULL::{relation}, $1::jsonb) c \
         WHERE ({order}) > ({cursor}) \
         ORDER BY {order} LIMIT $2"
    )
}

/// Upsert of a JSON array of row objects bound as `$1`.
///
/// Existing rows get only `columns` assigned. Rows absent from the table are
/// inserted with the key columns and `columns`; nothing else from the
/// payload is written, so columns outside the batch keep their values.
pub fn upsert_sql(schema: &str, table: &str, keys: &[String], columns: &[String]) -> String {
    let relation = qualified(schema, table);
    let all: Vec<&String> = keys.iter().chain(columns).collect();
    let targets = column_list(&all);
    let values = all
        .iter()
        .map(|column| format!("s.{}", quote_ident(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let incoming = format!("incoming AS (SELECT * FROM jsonb_populate_recordset(NULL::{relation}, $1::jsonb))");

    if columns.is_empty() {
        return format!(
            "WITH {incoming} \
             INSERT INTO {relation} ({targets}) \
             SELECT {values} FROM incoming s \
             WHERE NOT EXISTS (SELECT 1 FROM {relation} t WHERE {})",
            key_match("t", "s", keys)
        );
    }

    let assignments = columns
        .iter()
        .map(|column| {
            let quoted = quote_ident(column);
            format!("{quoted} = s.{quoted}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "WITH {incoming}, \
         updated AS (UPDATE {relation} t SET {assignments} FROM incoming s WHERE {} RETURNING {}) \
         INSERT INTO {relation} ({targets}) \
         SELECT {values} FROM incoming s \
         WHERE NOT EXISTS (SELECT 1 FROM updated u WHERE {})",
        key_match("t", "s", keys),
        key_order("t", keys),
        key_match("u", "s", keys)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn identifiers_escape_embedded_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified("public", "users"), "\"public\".\"users\"");
    }

    #[test]
    fn next_chunk_compares_the_whole_key_tuple() {
        let sql = next_chunk_sql("public", "members", &names(&["tenant", "id"]));
        assert_eq!(
            sql,
            "SELECT row_to_json(t.*) FROM \"public\".\"members\" t, \
             jsonb_populate_record(NULL::\"public\".\"members\", $1::jsonb) c \
             WHERE (t.\"tenant\", t.\"id\") > (c.\"tenant\", c.\"id\") \
             ORDER BY t.\"tenant\", t.\"id\" LIMIT $2"
        );
    }

    #[test]
    fn first_chunk_orders_by_every_key_column() {
        let sql = first_chunk_sql("public", "members", &names(&["tenant", "id"]));
        assert!(sql.ends_with("ORDER BY t.\"tenant\", t.\"id\" LIMIT $1"));
    }

    #[test]
    fn upsert_updates_only_the_given_columns_and_inserts_the_rest() {
        let sql = upsert_sql("public", "users", &names(&["id"]), &names(&["email", "name"]));
        assert_eq!(
            sql,
            "WITH incoming AS (SELECT * FROM jsonb_populate_recordset(NULL::\"public\".\"users\", $1::jsonb)), \
             updated AS (UPDATE \"public\".\"users\" t SET \"email\" = s.\"email\", \"name\" = s.\"name\" \
             FROM incoming s WHERE t.\"id\" = s.\"id\" RETURNING t.\"id\") \
             INSERT INTO \"public\".\"users\" (\"id\", \"email\", \"name\") \
             SELECT s.\"id\", s.\"email\", s.\"name\" FROM incoming s \
             WHERE NOT EXISTS (SELECT 1 FROM updated u WHERE u.\"id\" = s.\"id\")"
        );
        assert!(!sql.contains("ON CONFLICT"));
    }

    #[test]
    fn upsert_without_columns_only_inserts_absent_keys() {
        let sql = upsert_sql("app", "audit", &names(&["tenant", "id"]), &[]);
        assert!(!sql.contains("UPDATE"));
        assert!(sql.ends_with(
            "WHERE NOT EXISTS (SELECT 1 FROM \"app\".\"audit\" t WHERE t.\"tenant\" = s.\"tenant\" AND t.\"id\" = s.\"id\")"
        ));
    }
}
