use super::{FeatureList, Output, json_line, table};
use crate::Result;
use crate::client::ApiClient;
use crate::models::{ChecklistItem, ItemStatus, StatusUpdate};
use crate::report::{ReportSummary, group_by_feature};
use serde::Serialize;

/// Result of `qat session create`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
    pub items: usize,
    pub excluded: usize,
    pub features: Vec<String>,
}

impl Output for SessionCreated {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "Created session {} with {} item(s) from {}",
            self.session_id,
            self.items,
            self.features.join(", ")
        );
        if self.excluded > 0 {
            out.push_str(&format!(" ({} excluded)", self.excluded));
        }
        out
    }
}

/// Result of `qat session show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionShow {
    pub session_id: String,
    pub summary: ReportSummary,
    pub items: Vec<ChecklistItem>,
}

impl Output for SessionShow {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|item| {
                vec![
                    item.feature.clone(),
                    item.id.clone(),
                    item.status.to_string(),
                    item.bug_display().to_string(),
                    item.text.clone(),
                ]
            })
            .collect();
        let s = &self.summary;
        let mut lines = vec![
            format!("Session {}", self.session_id),
            format!(
                "{} item(s): {} pass, {} failed, {} pending",
                s.total, s.passed, s.failed, s.pending
            ),
        ];
        for group in group_by_feature(&self.items) {
            let g = &group.summary;
            lines.push(format!(
                "  {}: {}/{} pass, {} failed, {} pending",
                group.feature, g.passed, g.total, g.failed, g.pending
            ));
        }
        lines.push(String::new());
        lines.push(table(&["Feature", "ID", "Status", "Bug", "Text"], &rows));
        lines.join("\n")
    }
}

/// Result of `qat session mark`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMarked {
    pub session_id: String,
    pub item_id: String,
    pub status: ItemStatus,
    pub bug_id: Option<String>,
}

impl Output for ItemMarked {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        match &self.bug_id {
            Some(bug) => format!("Marked {} as {} (bug: {})", self.item_id, self.status, bug),
            None => format!("Marked {} as {}", self.item_id, self.status),
        }
    }
}

pub fn session_features(client: &ApiClient) -> Result<FeatureList> {
    Ok(FeatureList {
        features: client.features()?,
    })
}

/// Merge `features` on the server, drop excluded item ids from the draft,
/// then confirm what is left as a new session.
pub fn session_create(
    client: &ApiClient,
    features: Vec<String>,
    exclude: &[String],
) -> Result<SessionCreated> {
    let mut draft = client.merge(&features)?;

    let mut excluded = 0;
    for id in exclude {
        let removed = draft.remove(id);
        if removed == 0 {
            tracing::warn!(item = %id, "excluded item is not in the merged checklist");
        }
        excluded += removed;
    }

    let session_id = client.create_session(&draft)?;
    Ok(SessionCreated {
        session_id,
        items: draft.len(),
        excluded,
        features,
    })
}

pub fn session_show(client: &ApiClient, session_id: &str) -> Result<SessionShow> {
    let items = client.fetch_session(session_id)?;
    Ok(SessionShow {
        session_id: session_id.to_string(),
        summary: ReportSummary::from_items(&items),
        items,
    })
}

pub fn session_mark(
    client: &ApiClient,
    session_id: &str,
    item_id: &str,
    status: ItemStatus,
    bug: Option<String>,
) -> Result<ItemMarked> {
    let update = StatusUpdate::from_client(status, bug);
    client.update_status(session_id, item_id, &update)?;
    Ok(ItemMarked {
        session_id: session_id.to_string(),
        item_id: item_id.to_string(),
        status: update.status,
        bug_id: update.bug_id,
    })
}
