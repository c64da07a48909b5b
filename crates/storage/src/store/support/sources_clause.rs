use super::refs_tx::RefSource;
use rusqlite::types::Value as SqlValue;

pub(in crate::store) fn append_sources_clause(
    sql: &mut String,
    params: &mut Vec<SqlValue>,
    sources: &[RefSource],
) {
    sql.push('(');
    for (index, source) in sources.iter().enumerate() {
        if index > 0 {
            sql.push_str(" OR ");
        }
        sql.push_str("(c.ref_id=?");
        params.push(SqlValue::Integer(source.ref_id));
        if let Some(cutoff) = source.cutoff_seq {
            sql.push_str(" AND c.seq <= ?");
            params.push(SqlValue::Integer(cutoff));
        }
        sql.push(')');
    }
    sql.push(')');
}
