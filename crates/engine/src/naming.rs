// ABOUTME: Deterministic output file names for rendered and downloaded artifacts.
// ABOUTME: Box scores use "{home} vs {away} {date}.pdf" when known, else the URL's trailing segment.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TeamIdentity;
use crate::models::ResolvedBoxScore;

static INVALID_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("valid regex"));

/// Replaces characters that are invalid in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    INVALID_FILENAME_CHARS.replace_all(name.trim(), "_").into_owned()
}

pub fn roster_filename(team: &TeamIdentity) -> String {
    format!("{} Roster.pdf", team.name)
}

pub fn schedule_filename(team: &TeamIdentity) -> String {
    format!("{} Schedule.pdf", team.name)
}

pub fn stats_filename(team: &TeamIdentity, year: i32) -> String {
    format!("{} {} Stats.pdf", team.name, year)
}

pub fn article_filename(headline: &str) -> String {
    format!("{}.pdf", headline.replace('/', "_"))
}

pub fn box_score_filename(resolved: &ResolvedBoxScore) -> String {
    match (&resolved.home_team, &resolved.away_team) {
        (Some(home), Some(away)) => match &resolved.date {
            Some(date) => format!("{} vs {} {}.pdf", home, away, date),
            None => format!("{} vs {}.pdf", home, away),
        },
        _ => trailing_segment(&resolved.pdf_url),
    }
}

/// Last non-empty path segment of a URL, ignoring query and fragment.
pub fn trailing_segment(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolved(home: Option<&str>, away: Option<&str>, date: Option<&str>, url: &str) -> ResolvedBoxScore {
        ResolvedBoxScore {
            home_team: home.map(str::to_string),
            away_team: away.map(str::to_string),
            date: date.map(str::to_string),
            pdf_url: url.to_string(),
        }
    }

    #[test]
    fn known_teams_use_matchup_name() {
        let r = resolved(Some("UIC"), Some("Northwestern"), Some("9_3_2024"), "https://x.org/a.pdf");
        assert_eq!(box_score_filename(&r), "UIC vs Northwestern 9_3_2024.pdf");
    }

    #[test]
    fn unknown_teams_use_url_tail() {
        let r = resolved(None, None, None, "https://bigten.org/documents/2024/9/3/MSOC_NU_UIC.pdf?id=7");
        assert_eq!(box_score_filename(&r), "MSOC_NU_UIC.pdf");
    }

    #[test]
    fn headline_slashes_become_underscores() {
        assert_eq!(article_filename("Win/loss recap"), "Win_loss recap.pdf");
    }

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename(r#"a:b*c?"d<e>f|g\h/i"#), "a_b_c__d_e_f_g_h_i");
    }
}
