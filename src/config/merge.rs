use super::value::{Table, Value};

/// Merges `from` into `into`, returning `into`.
///
/// Tables present on both sides are merged recursively, keeping keys of
/// `into` that `from` does not mention. Every other value in `from`,
/// including arrays and atomics, replaces what `into` held at that key.
pub fn extend_deep(into: &mut Table, from: Table) -> &mut Table {
    for (key, value) in from {
        match (into.get_mut(&key), value) {
            (_, value @ Value::Atomic(_)) => {
                into.insert(key, value);
            }
            (Some(Value::Table(into_table)), Value::Table(from_table)) => {
                extend_deep(into_table, from_table);
            }
            (_, value) => {
                into.insert(key, value);
            }
        }
    }
    into
}
