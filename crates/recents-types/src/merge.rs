//! Merge rules applied when a summary row is refreshed.
//!
//! The feed path and the client-push path deliberately disagree on the unread
//! counter: the feed recomputes the true value every pass and overwrites it,
//! while a client push can only raise it.

use chrono::{DateTime, Utc};

use crate::message::PartnerActivity;
use crate::summary::{ConversationSummary, PartnerProfile, SummaryUpdate};

/// Merge feed activity into the stored row for `owner`.
///
/// Returns `None` when the merged row equals the stored one, so callers can
/// skip the write and leave `updated_at` untouched.
pub fn merge_feed(
    existing: Option<&ConversationSummary>,
    owner: &str,
    activity: &PartnerActivity,
    profile: Option<&PartnerProfile>,
    now: DateTime<Utc>,
) -> Option<ConversationSummary> {
    let mut next = existing
        .cloned()
        .unwrap_or_else(|| ConversationSummary::new(owner, &activity.partner_id, now));

    if let Some(profile) = profile {
        if let Some(name) = &profile.display_name {
            next.partner_display_name = Some(name.clone());
        }
        if let Some(avatar) = &profile.avatar {
            next.partner_avatar = Some(avatar.clone());
        }
    }

    // The feed is the source of truth for the snapshot. A stored timestamp
    // newer than the feed's comes from a placeholder row or a client push,
    // not from a real message.
    next.last_message = Some(activity.last_content.clone());
    next.last_message_at = Some(activity.last_timestamp);
    next.unread_count = activity.unread_count;

    if existing == Some(&next) {
        return None;
    }

    next.updated_at = now;
    Some(next)
}

/// Merge a client-pushed update into the stored row.
///
/// Every field is overwritten except the unread counter, which only moves
/// when the incoming value is strictly positive.
pub fn merge_push(
    existing: Option<&ConversationSummary>,
    update: &SummaryUpdate,
    now: DateTime<Utc>,
) -> ConversationSummary {
    let mut next = existing
        .cloned()
        .unwrap_or_else(|| ConversationSummary::new(&update.owner_id, &update.partner_id, now));
    let delta = &update.delta;

    next.partner_display_name = delta.display_name.clone();
    next.partner_avatar = delta.avatar.clone();
    next.last_message = delta.last_message.clone();
    next.last_message_at = delta.last_seen;

    if let Some(count) = delta.unread_count.filter(|count| *count > 0) {
        next.unread_count = count;
    }

    next.updated_at = now;
    next
}
