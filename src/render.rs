//! Plain-text rendering of directory data for the terminal.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::consts::NO_MATCHES;
use crate::events::Event;
use crate::flows::{ProfileView, SearchStatus, SearchView, SubmitReceipt};
use crate::model::{CvDetail, Education, Experience, Profile};
use crate::session::StoredAccount;
use crate::session::token::Claims;

const VERIFIED: &str = "✓ verified";
const UNVERIFIED: &str = "✗ not verified";

/// `start - end`, with a missing end shown as open-ended.
pub fn format_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let start = start.map_or_else(|| "?".to_string(), |d| d.to_string());
    let end = end.map_or_else(|| "Present".to_string(), |d| d.to_string());
    format!("{start} - {end}")
}

fn verified_label(verified: bool) -> &'static str {
    if verified { VERIFIED } else { UNVERIFIED }
}

/// One-line summary used in search listings.
pub fn profile_line(profile: &Profile) -> String {
    let mut line = format!(
        "#{:<5} {}  [{}]",
        profile.user_id, profile.full_name, profile.verification_badge
    );
    if let Some(headline) = profile.headline.as_deref().filter(|h| !h.is_empty()) {
        let _ = write!(line, "  {headline}");
    }
    if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
        let _ = write!(line, "  ({location})");
    }
    line
}

pub fn education_line(edu: &Education) -> String {
    let mut line = edu.degree.clone();
    if let Some(field) = edu.field_of_study.as_deref().filter(|f| !f.is_empty()) {
        let _ = write!(line, " in {field}");
    }
    let _ = write!(
        line,
        ", {} ({})  {}",
        edu.institution,
        format_period(edu.start_date, edu.end_date),
        verified_label(edu.is_verified)
    );
    line
}

pub fn experience_line(exp: &Experience) -> String {
    format!(
        "{} at {} ({})  {}",
        exp.role,
        exp.company,
        format_period(exp.start_date, exp.effective_end()),
        verified_label(exp.is_verified)
    )
}

fn render_cv(out: &mut String, cv: &CvDetail) {
    let _ = writeln!(out, "\n   headline  {}", cv.cv.headline);
    if let Some(summary) = cv.cv.summary.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   summary   {summary}");
    }

    let _ = writeln!(out, "\n   experience");
    if cv.experience.is_empty() {
        let _ = writeln!(out, "     (none)");
    }
    for exp in &cv.experience {
        let _ = writeln!(out, "     - {}", experience_line(exp));
        if let Some(desc) = exp.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "       {desc}");
        }
    }

    let _ = writeln!(out, "\n   education");
    if cv.education.is_empty() {
        let _ = writeln!(out, "     (none)");
    }
    for edu in &cv.education {
        let _ = writeln!(out, "     - {}", education_line(edu));
    }
}

/// Full profile page: entry fields, then the CV when there is one.
pub fn render_profile(view: &ProfileView) -> String {
    let p = &view.profile;
    let mut out = String::new();
    let _ = writeln!(out, "   {}  [{}]", p.full_name, p.verification_badge);
    if let Some(headline) = p.headline.as_deref().filter(|h| !h.is_empty()) {
        let _ = writeln!(out, "   {headline}");
    }
    if let Some(location) = p.location.as_deref().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "   location  {location}");
    }
    let _ = writeln!(
        out,
        "   listed    {}",
        if p.is_visible { "visible" } else { "hidden" }
    );
    let _ = writeln!(out, "   views     {}", p.profile_views);

    match &view.cv {
        Some(cv) => render_cv(&mut out, cv),
        None => {
            let _ = writeln!(out, "\n   no CV on file");
        }
    }
    out
}

/// The current search result set, or the terminal state explaining why
/// there is none.
pub fn render_search(view: &SearchView) -> String {
    let mut out = String::new();
    match view.status() {
        SearchStatus::Idle => {}
        SearchStatus::NoMatches => {
            let _ = writeln!(out, "{NO_MATCHES}");
        }
        SearchStatus::Failed(message) => {
            let _ = writeln!(out, "error: {message}");
        }
        SearchStatus::Results(count) => {
            let noun = if *count == 1 { "professional" } else { "professionals" };
            let _ = writeln!(out, "{count} {noun} found");
            for profile in view.results() {
                let _ = writeln!(out, "  {}", profile_line(profile));
            }
        }
    }
    out
}

pub fn render_receipt(receipt: &SubmitReceipt) -> String {
    format!(
        "✓ CV #{} created ({} education, {} experience) and listed in the directory",
        receipt.cv_id, receipt.education_attached, receipt.experience_attached
    )
}

/// One progress line for a submission event.
pub fn render_event(event: &Event) -> String {
    match event {
        Event::CvCreated { cv_id } => format!("  ✓ created CV #{cv_id}"),
        Event::EducationAttached { institution, .. } => {
            format!("  ✓ attached education: {institution}")
        }
        Event::ExperienceAttached { company, .. } => {
            format!("  ✓ attached experience: {company}")
        }
        Event::EntrySkipped { section, index } => {
            format!("  - skipped blank {section} entry #{}", index + 1)
        }
        Event::DirectoryJoined => "  ✓ joined the directory".to_string(),
    }
}

/// Who the stored session belongs to.
pub fn render_account(api_url: &str, account: &StoredAccount, claims: Option<&Claims>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "   backend   {api_url}");
    let _ = writeln!(out, "   account   {} <{}>", account.full_name, account.email);
    if !account.roles.is_empty() {
        let _ = writeln!(out, "   roles     {}", account.roles.join(", "));
    }
    if let Some(claims) = claims
        && let Some(expires) = claims.expires_at()
    {
        let state = if claims.is_expired() { "expired" } else { "valid" };
        let _ = writeln!(out, "   token     {state} (expires {})", expires.to_rfc3339());
    }
    out
}
