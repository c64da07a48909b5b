#![forbid(unsafe_code)]

use std::fmt::Write as _;

pub const MAIN_BRANCH: &str = "main";
pub const PROPOSAL_BRANCH_ROOT: &str = "proposal/";

/// Longest name [`proposal_branch_name`] can produce for valid ids: every
/// byte of both segments escaped to `%XX`, plus the root and separator.
pub const MAX_PROPOSAL_BRANCH_LEN: usize =
    PROPOSAL_BRANCH_ROOT.len() + 1 + 2 * 3 * crate::ids::MAX_KEY_PART_LEN;

/// Deterministic branch name of the single proposal slot for (user_id, label).
pub fn proposal_branch_name(user_id: &str, label: &str) -> String {
    format!(
        "{}{}",
        proposal_branch_prefix(user_id),
        escape_segment(label)
    )
}

/// Prefix shared by every proposal branch of one user.
pub fn proposal_branch_prefix(user_id: &str) -> String {
    format!("{PROPOSAL_BRANCH_ROOT}{}/", escape_segment(user_id))
}

/// Inverse of [`proposal_branch_name`]: returns (user_id, label).
pub fn parse_proposal_branch(name: &str) -> Option<(String, String)> {
    let rest = name.strip_prefix(PROPOSAL_BRANCH_ROOT)?;
    let (user, label) = rest.split_once('/')?;
    if user.is_empty() || label.is_empty() || label.contains('/') {
        return None;
    }
    Some((unescape_segment(user)?, unescape_segment(label)?))
}

/// Percent-encodes `%`, `/`, whitespace and control characters.
pub fn escape_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '%' || ch == '/' || ch.is_whitespace() || ch.is_control() {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                let _ = write!(&mut out, "%{byte:02X}");
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn unescape_segment(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = value.get(index + 1..index + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            out.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8(out).ok()
}
