//! The job boards we scrape, one static profile each.

use crate::extract::SiteProfile;

mod amazon;
mod google;
mod justjoin;
mod linkedin;
mod nofluffjobs;
mod olx;
mod pracuj;
mod rocketjobs;

pub static ALL: [&SiteProfile; 8] = [
    &pracuj::PROFILE,
    &justjoin::PROFILE,
    &rocketjobs::PROFILE,
    &google::PROFILE,
    &amazon::PROFILE,
    &nofluffjobs::PROFILE,
    &linkedin::PROFILE,
    &olx::PROFILE,
];

pub fn profile(name: &str) -> Option<&'static SiteProfile> {
    ALL.iter().copied().find(|p| p.name == name)
}

pub fn names() -> Vec<&'static str> {
    ALL.iter().map(|p| p.name).collect()
}

/// Drops the query string; several boards append per-render tracking ids.
pub(crate) fn strip_query(url: &mut String) {
    if let Some(cut) = url.find('?') {
        url.truncate(cut);
    }
}
