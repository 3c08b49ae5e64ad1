//! Mapping of raw reader identifiers to symbol-table keys.

/// Canonicalizes a raw identifier into the key used by symbol tables.
pub trait NameNormalizer {
    fn normalize(&self, raw: &str) -> String;
}

impl<F> NameNormalizer for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Keys are the raw names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl NameNormalizer for Verbatim {
    fn normalize(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Verilog escaped identifiers (`\a.b[0] `) lose their backslash and the
/// terminating whitespace. An escaped identifier runs up to that whitespace, so
/// flattened names (`\u1/n5 `) and composed instance pins (`\u$1 /A`) both
/// normalize to plain `/`-separated keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerilogNames;

impl NameNormalizer for VerilogNames {
    fn normalize(&self, raw: &str) -> String {
        if !raw.contains('\\') {
            return raw.to_string();
        }
        let mut key = String::with_capacity(raw.len());
        let mut escaped = false;
        let mut terminated = false;
        for c in raw.chars() {
            if escaped {
                if c.is_whitespace() {
                    escaped = false;
                    terminated = true;
                } else {
                    key.push(c);
                }
                continue;
            }
            if terminated && c.is_whitespace() {
                continue;
            }
            terminated = false;
            if c == '\\' {
                escaped = true;
            } else {
                key.push(c);
            }
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("clk", "clk" ; "plain")]
    #[test_case("bus[3]", "bus[3]" ; "bit select")]
    #[test_case("\\a.b ", "a.b" ; "escaped")]
    #[test_case("\\u$1 /A", "u$1/A" ; "escaped instance pin")]
    #[test_case("u1/\\n[0] ", "u1/n[0]" ; "escaped net under instance")]
    #[test_case("\\u1/n5 ", "u1/n5" ; "flattened escaped name")]
    #[test_case("\\a\\b  ", "a\\b" ; "backslash inside escaped name")]
    fn test_verilog_names(raw: &str, expected: &str) {
        assert_eq!(VerilogNames.normalize(raw), expected);
    }

    #[test]
    fn test_closure_normalizer() {
        let upper = |raw: &str| raw.to_uppercase();
        assert_eq!(upper.normalize("net"), "NET");
        assert_eq!(Verbatim.normalize("\\x "), "\\x ");
    }
}
