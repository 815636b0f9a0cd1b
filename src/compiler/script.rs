//! Annotation-path helpers: an annotation's SQL string is either a plain
//! string (passed through `${}` pre-interpolation, §4.D) or wrapped in
//! `<script>...</script>`, in which case it is parsed as a single-element
//! XML document and compiled the same way an XML statement body is.

pub fn is_script(sql: &str) -> bool {
    let trimmed = sql.trim();
    trimmed.starts_with("<script>") && trimmed.ends_with("</script>")
}
