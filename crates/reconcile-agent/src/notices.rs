//! Push notification notices.

use sync_signal_types::{Notice, OpenWindowRequest, PushPayload};
use tracing::debug;

/// Build the user-visible notice for a push payload.
///
/// Fields the payload omits fall back to generic defaults so a bare push
/// still surfaces something readable.
pub fn handle_push(payload: &PushPayload) -> Notice {
    let notice = Notice::from_payload(payload);
    debug!(title = %notice.title, "Surfacing push notice");
    notice
}

/// The user interacted with a notice; return the window-open request if
/// the payload named a target.
pub fn notice_activated(payload: &PushPayload) -> Option<OpenWindowRequest> {
    payload
        .url
        .as_ref()
        .map(|url| OpenWindowRequest { url: url.clone() })
}
