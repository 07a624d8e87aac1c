//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Unknown braces (e.g. JSON examples inside a prompt) are left untouched.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge model responses.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_leaves_unknown_braces() {
    let out = fill_template("{category} / {\"id\": \"a\"}", &[("category", "Jazz")]);
    assert_eq!(out, "Jazz / {\"id\": \"a\"}");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "héllo wörld";
    let out = trunc_for_log(s, 2);
    assert!(out.starts_with('h'));
    assert!(out.ends_with("bytes total)"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
