use chrono::Utc;
use rocket::{
    http::{ContentType, Header},
    serde::json::Json,
    Route, State,
};

use crate::contest::Contest;
use crate::error::Result;
use crate::export::results_csv;
use crate::model::{
    api::admin::{BackupList, SettingsUpdated},
    settings::SettingsPatch,
};

pub fn routes() -> Vec<Route> {
    routes![update_settings, download_backup, export_csv, list_backups]
}

/// A body the browser should save rather than display.
#[derive(Debug, Responder)]
struct Attachment {
    body: (ContentType, String),
    disposition: Header<'static>,
}

impl Attachment {
    fn new(content_type: ContentType, filename: String, body: String) -> Self {
        Self {
            body: (content_type, body),
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename={filename}"),
            ),
        }
    }
}

fn file_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

#[post("/api/settings", data = "<patch>", format = "json")]
async fn update_settings(
    patch: Json<SettingsPatch>,
    contest: &State<Contest>,
) -> Result<Json<SettingsUpdated>> {
    let settings = contest.update_settings(patch.0).await?;
    Ok(Json(settings.into()))
}

#[get("/api/backup/download")]
async fn download_backup(contest: &State<Contest>) -> Result<Attachment> {
    let doc = contest.document().await?;
    Ok(Attachment::new(
        ContentType::JSON,
        format!("contest_data_{}.json", file_timestamp()),
        serde_json::to_string_pretty(&doc)?,
    ))
}

#[get("/api/backup/export-csv")]
async fn export_csv(contest: &State<Contest>) -> Result<Attachment> {
    let doc = contest.document().await?;
    Ok(Attachment::new(
        ContentType::CSV,
        format!("contest_results_{}.csv", file_timestamp()),
        results_csv(&doc),
    ))
}

#[get("/api/backups")]
async fn list_backups(contest: &State<Contest>) -> Result<Json<BackupList>> {
    let backups = contest.backups();
    Ok(Json(BackupList {
        backups: backups.list().await?,
        retention: backups.retention(),
    }))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use crate::config::DataLayout;
    use crate::model::{document::ContestDocument, settings::Settings};

    use super::*;

    #[backend_test]
    async fn partial_settings_updates(client: Client, layout: DataLayout) {
        let response = client
            .post(uri!(update_settings))
            .header(ContentType::JSON)
            .body(r#"{"show_votes": true}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let updated: SettingsUpdated = response.into_json().await.unwrap();
        assert!(updated.success);
        assert_eq!(
            updated.settings,
            Settings {
                show_votes: true,
                voting_enabled: true
            }
        );

        let response = client
            .post(uri!(update_settings))
            .header(ContentType::JSON)
            .body(r#"{"voting_enabled": false}"#)
            .dispatch()
            .await;
        let updated: SettingsUpdated = response.into_json().await.unwrap();
        assert_eq!(
            updated.settings,
            Settings {
                show_votes: true,
                voting_enabled: false
            }
        );

        // An empty update changes nothing but still succeeds.
        let response = client
            .post(uri!(update_settings))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;
        let updated: SettingsUpdated = response.into_json().await.unwrap();
        assert!(!updated.settings.voting_enabled);

        let stored: ContestDocument =
            serde_json::from_slice(&std::fs::read(layout.document()).unwrap()).unwrap();
        assert_eq!(stored.settings, updated.settings);
    }

    #[backend_test(seeded)]
    async fn download_is_the_document(client: Client) {
        let response = client.get(uri!(download_backup)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        let disposition = response
            .headers()
            .get_one("Content-Disposition")
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=contest_data_"));
        assert!(disposition.ends_with(".json"));

        let doc: ContestDocument = response.into_json().await.unwrap();
        assert_eq!(doc, ContestDocument::example());
    }

    #[backend_test(seeded)]
    async fn csv_export(client: Client) {
        let response = client.get(uri!(export_csv)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::CSV));
        let disposition = response
            .headers()
            .get_one("Content-Disposition")
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=contest_results_"));
        assert!(disposition.ends_with(".csv"));

        let body = response.into_string().await.unwrap();
        assert_eq!(body, results_csv(&ContestDocument::example()));
    }

    #[backend_test]
    async fn backups_start_empty(client: Client) {
        let response = client.get(uri!(list_backups)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let list: BackupList = response.into_json().await.unwrap();
        assert!(list.backups.is_empty());
        assert_eq!(list.retention, 10);
    }
}
