use std::path::PathBuf;

use anyhow::{Context, Result};

/// Value of `--name=value` or `--name value` among `args`.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn parse_arg<T>(args: &[String], name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))
        })
        .transpose()
}

pub fn path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    arg_value(args, name).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reads_both_arg_forms() {
        let a = args(&["--db=/tmp/x.sqlite", "--round", "7", "--limit", "--position=MID"]);
        assert_eq!(arg_value(&a, "--db").as_deref(), Some("/tmp/x.sqlite"));
        assert_eq!(parse_arg::<u32>(&a, "--round").unwrap(), Some(7));
        assert_eq!(arg_value(&a, "--limit"), None);
        assert_eq!(arg_value(&a, "--position").as_deref(), Some("MID"));
    }

    #[test]
    fn bad_number_is_an_error() {
        let a = args(&["--horizon=three"]);
        assert!(parse_arg::<u32>(&a, "--horizon").is_err());
    }
}
