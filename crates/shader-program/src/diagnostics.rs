//! Compiler log remapping
//!
//! Drivers report errors against the physical lines of the expanded source
//! they were given. These helpers rewrite such references to the logical file
//! and line a developer can actually open.

use crate::ProcessedSource;
use regex::Regex;
use std::sync::LazyLock;

/// Line format: `0:123(10): error: ...`
///
/// Only compilation unit `0` is recognized since every stage is compiled from
/// exactly one source string.
static ERROR_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0:(\d+)\((\d+)\):( .*)$").unwrap());

/// Rewrites physical line references in a compiler log to logical ones
///
/// Each line of the form `0:<line>(<col>): <message>` whose physical line is
/// known to `source` becomes `<file>:<logical line>(<col>): <message>`. Every
/// other line is kept as is, and line order is preserved.
pub fn remap_log(raw_log: &str, source: &ProcessedSource) -> String {
    raw_log.split('\n').map(|line| remap_line(line, source)).collect::<Vec<_>>().join("\n")
}

fn remap_line(line: &str, source: &ProcessedSource) -> String {
    let Some(captures) = ERROR_LINE_REGEX.captures(line) else {
        return line.to_string();
    };

    let (Ok(physical_line), Ok(column)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>()) else {
        return line.to_string();
    };

    match source.line_origin(physical_line) {
        Some(origin) => format!("{}:{}({}):{}", origin.file, origin.line, column, &captures[3]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineOrigin;

    /// 50 physical lines; lines 40..=50 come from `common.glsl` starting at line 8
    fn sample_source() -> ProcessedSource {
        let origins = (1..=50)
            .map(|line| if line < 40 { LineOrigin::new("main.glsl", line) } else { LineOrigin::new("common.glsl", line - 32) })
            .collect();
        ProcessedSource::new("x\n".repeat(50), origins)
    }

    #[test]
    fn test_remap_error_line() {
        let remapped = remap_log("0:42(7): error: undeclared identifier 'x'", &sample_source());
        assert_eq!(remapped, "common.glsl:10(7): error: undeclared identifier 'x'");
    }

    #[test]
    fn test_unmatched_lines_pass_through() {
        let log = "Shader info log:\n0:3(1): warning: unused variable\nWARNING: 0:3: something else\n";
        let remapped = remap_log(log, &sample_source());
        assert_eq!(remapped, "Shader info log:\nmain.glsl:3(1): warning: unused variable\nWARNING: 0:3: something else\n");
    }

    #[test]
    fn test_other_compilation_units_are_not_rewritten() {
        let log = "1:42(7): error: in another unit";
        assert_eq!(remap_log(log, &sample_source()), log);
    }

    #[test]
    fn test_unmapped_and_oversized_lines_pass_through() {
        let source = sample_source();
        assert_eq!(remap_log("0:51(1): error: past the end", &source), "0:51(1): error: past the end");
        assert_eq!(remap_log("0:0(1): error: no line", &source), "0:0(1): error: no line");
        let huge = "0:99999999999999999999(1): error: overflow";
        assert_eq!(remap_log(huge, &source), huge);
    }

    #[test]
    fn test_crlf_and_empty_logs() {
        let source = sample_source();
        assert_eq!(remap_log("", &source), "");
        assert_eq!(remap_log("0:1(2): error: a\r\nsummary\r", &source), "main.glsl:1(2): error: a\r\nsummary\r");
    }
}
