/// Checks if a candidate string matches a wildcard pattern
///
/// `*` matches any run of characters (including none); every other character
/// matches itself. Matching is anchored at both ends and case-sensitive.
///
/// # Examples
///
/// ```
/// use price_sweep::url::matches_wildcard;
///
/// assert!(matches_wildcard("/shirt.php?id=*", "/shirt.php?id=101"));
/// assert!(matches_wildcard("/item/*/detail", "/item/42/detail"));
/// assert!(!matches_wildcard("/shirt.php?id=*", "/shirts.php"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let (mut p, mut c) = (0, 0);
    // Position of the last `*` seen and the candidate index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while c < candidate.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, c));
            p += 1;
        } else if p < pattern.len() && pattern[p] == candidate[c] {
            p += 1;
            c += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            c = tried + 1;
            backtrack = Some((star, tried + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&ch| ch == '*')
}
