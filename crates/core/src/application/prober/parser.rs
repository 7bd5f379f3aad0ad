// Reachability output parser
//
// Result lines look like `Host <name> is <status>`, possibly wrapped by the
// binary's own formatting, e.g. `    "msg": "Host web1 is reachable"`.

use crate::domain::HostResults;

/// Marker for the host announcement
const HOST_MARKER: &str = "Host ";

/// Marker for the status announcement
const STATUS_MARKER: &str = " is ";

const QUOTES: &[char] = &['"', '\''];

/// Parse every result line into a hostname -> status map (last write wins)
pub fn parse_reachability(output: &str) -> HostResults {
    let mut results = HostResults::new();

    for line in output.lines() {
        if !(line.contains(HOST_MARKER) && line.contains(STATUS_MARKER)) {
            continue;
        }
        if let Some((host, status)) = parse_result_line(line) {
            results.insert(host, status);
        }
    }

    results
}

/// Fields after the `Host` token: `<host> is <status>`
fn parse_result_line(line: &str) -> Option<(String, String)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let at = fields
        .iter()
        .position(|f| f.trim_start_matches(QUOTES) == "Host")?;

    let host = *fields.get(at + 1)?;
    if *fields.get(at + 2)? != "is" {
        return None;
    }
    let status = fields
        .get(at + 3)?
        .trim_end_matches(',')
        .trim_matches(QUOTES);

    if host.is_empty() || status.is_empty() {
        return None;
    }
    Some((host.to_string(), status.to_string()))
}
