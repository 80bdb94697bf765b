use crate::domain::models::{ConfigProperty, PropertySource};

/// Property keys every database inherits a farm default for.
pub const DEFAULT_PROPERTY_KEYS: [&str; 6] =
    ["type", "shared", "nthreads", "optpipe", "readonly", "nclients"];

/// The known keys with no values filled in yet.
pub fn default_properties() -> Vec<ConfigProperty> {
    DEFAULT_PROPERTY_KEYS
        .iter()
        .map(|key| ConfigProperty {
            key: key.to_string(),
            value: None,
        })
        .collect()
}

/// Build a property table from a newline-delimited `key=value` body: the
/// known keys are always present, values only where the body sets them.
/// Keys the daemon knows beyond ours are appended as-is.
pub fn parse_props_buf(body: &str) -> Vec<ConfigProperty> {
    let mut table = default_properties();
    for line in body.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match table.iter_mut().find(|p| p.key == key) {
            Some(prop) => prop.value = Some(value.to_string()),
            None => table.push(ConfigProperty {
                key: key.to_string(),
                value: Some(value.to_string()),
            }),
        }
    }
    table
}

pub fn find<'a>(table: &'a [ConfigProperty], key: &str) -> Option<&'a ConfigProperty> {
    table.iter().find(|p| p.key == key)
}

/// Resolve `key` against a per-database table with the farm defaults as
/// fallback. `None` means the key is unknown altogether; otherwise the
/// supplying tier is reported alongside the value.
pub fn resolve<'a>(
    local: &'a [ConfigProperty],
    defaults: &'a [ConfigProperty],
    key: &str,
) -> Option<(PropertySource, &'a str)> {
    let prop = find(local, key)?;
    match &prop.value {
        Some(value) => Some((PropertySource::Local, value)),
        None => {
            let value = find(defaults, key)
                .and_then(|p| p.value.as_deref())
                .unwrap_or("<unknown>");
            Some((PropertySource::Default, value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_table_always_carries_the_known_keys() {
        let table = parse_props_buf("shared=no\n");
        assert_eq!(table.len(), DEFAULT_PROPERTY_KEYS.len());
        assert_eq!(
            find(&table, "shared").and_then(|p| p.value.as_deref()),
            Some("no")
        );
        assert_eq!(find(&table, "nthreads").and_then(|p| p.value.as_deref()), None);
    }

    #[test]
    fn daemon_side_extra_keys_are_kept() {
        let table = parse_props_buf("embedr=yes\n");
        assert_eq!(
            find(&table, "embedr").and_then(|p| p.value.as_deref()),
            Some("yes")
        );
    }

    #[test]
    fn local_value_wins_over_default() {
        let defaults = parse_props_buf("shared=yes\nnthreads=8\n");
        let local = parse_props_buf("shared=no\n");

        assert_eq!(
            resolve(&local, &defaults, "shared"),
            Some((PropertySource::Local, "no"))
        );
        assert_eq!(
            resolve(&local, &defaults, "nthreads"),
            Some((PropertySource::Default, "8"))
        );
        assert_eq!(
            resolve(&local, &defaults, "optpipe"),
            Some((PropertySource::Default, "<unknown>"))
        );
        assert_eq!(resolve(&local, &defaults, "bogus"), None);
    }
}
