use chrono::Utc;
use log::{debug, info, warn};
use rocket::tokio::fs;

use crate::error::{Error, Result};
use crate::model::{
    entry::{Entry, EntrySpec},
    photo::{batch_token, stored_name, PhotoUpload},
};

use super::Contest;

impl Contest {
    /// Register a new entry.
    ///
    /// Uploads whose filename is not an allowed image type are skipped; at
    /// least one must remain. Photos are stored under generated names before
    /// the entry is recorded, and removed again if recording fails.
    pub async fn submit<P: PhotoUpload>(
        &self,
        spec: EntrySpec,
        photos: &mut [P],
    ) -> Result<Entry> {
        let spec = spec.validated()?;
        if photos
            .iter()
            .all(|photo| photo.client_name().map_or(true, str::is_empty))
        {
            return Err(Error::validation("At least one photo is required"));
        }

        fs::create_dir_all(&self.uploads)
            .await
            .map_err(Error::storage("creating uploads directory"))?;

        let now = Utc::now();
        let batch = batch_token();
        let mut stored = Vec::new();
        for (index, photo) in photos.iter_mut().enumerate() {
            let Some(name) = photo
                .client_name()
                .and_then(|client_name| stored_name(client_name, now, &batch, index))
            else {
                debug!("Skipping upload {index}: not an allowed image type");
                continue;
            };
            if let Err(e) = photo.store_at(&self.uploads.join(&name)).await {
                self.discard_photos(&stored).await;
                return Err(Error::storage("storing uploaded photo")(e));
            }
            stored.push(name);
        }
        if stored.is_empty() {
            return Err(Error::validation(
                "No valid images uploaded. Please upload image files.",
            ));
        }

        let photo_names = stored.clone();
        let entry = match self
            .store
            .mutate(move |doc| doc.add_entry(spec, photo_names, now))
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                self.discard_photos(&stored).await;
                return Err(e);
            }
        };
        info!(
            "Entry {} ({}) submitted with {} photo(s)",
            entry.id,
            entry.costume_name,
            entry.photos.len()
        );

        self.backup().await;
        Ok(entry)
    }

    async fn discard_photos(&self, names: &[String]) {
        for name in names {
            if let Err(e) = fs::remove_file(self.uploads.join(name)).await {
                warn!("Could not remove orphaned photo {name}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::contest::test_support::temp_contest;
    use crate::model::photo::test_support::MemoryPhoto;

    use super::*;

    fn spec(name: &str, costume_name: &str) -> EntrySpec {
        EntrySpec {
            name: name.to_string(),
            costume_name: costume_name.to_string(),
            description: "Homemade".to_string(),
        }
    }

    fn uploads(contest: &Contest) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(contest.uploads_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[rocket::async_test]
    async fn submit_stores_entry_and_photos() {
        let (_dir, contest) = temp_contest();
        let mut photos = [MemoryPhoto::named("witch.png"), MemoryPhoto::named("hat.JPG")];

        let entry = contest
            .submit(spec(" Elphaba ", "Wicked Witch"), &mut photos)
            .await
            .unwrap();
        assert_eq!(entry.id, "1");
        assert_eq!(entry.name, "Elphaba");
        assert_eq!(entry.photos.len(), 2);
        assert!(entry.photos[0].ends_with("_0_witch.png"));
        assert!(entry.photos[1].ends_with("_1_hat.jpg"));
        assert_eq!(uploads(&contest), {
            let mut expected = entry.photos.clone();
            expected.sort();
            expected
        });

        let on_disk = std::fs::read(contest.uploads_dir().join(&entry.photos[0])).unwrap();
        assert_eq!(on_disk, b"witch.png");

        let doc = contest.document().await.unwrap();
        assert_eq!(doc.entries, vec![entry]);
    }

    #[rocket::async_test]
    async fn submit_takes_a_backup() {
        let (_dir, contest) = temp_contest();
        let mut photos = [MemoryPhoto::named("ghost.gif")];
        contest.submit(spec("Casper", "Ghost"), &mut photos).await.unwrap();
        assert_eq!(contest.backups().list().await.unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn blank_name_leaves_entries_unchanged() {
        let (_dir, contest) = temp_contest();
        let mut photos = [MemoryPhoto::named("ghost.gif")];
        let result = contest.submit(spec("  ", "Ghost"), &mut photos).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(contest.document().await.unwrap().entries.is_empty());
        assert!(uploads(&contest).is_empty());
    }

    #[rocket::async_test]
    async fn no_photos_is_rejected() {
        let (_dir, contest) = temp_contest();
        let mut photos: [MemoryPhoto; 0] = [];
        let result = contest.submit(spec("Casper", "Ghost"), &mut photos).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let mut photos = [MemoryPhoto {
            name: Some(String::new()),
            bytes: Vec::new(),
        }];
        let result = contest.submit(spec("Casper", "Ghost"), &mut photos).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[rocket::async_test]
    async fn disallowed_types_are_skipped() {
        let (_dir, contest) = temp_contest();
        let mut photos = [
            MemoryPhoto::named("notes.txt"),
            MemoryPhoto::named("bat.webp"),
            MemoryPhoto::named("run.exe"),
        ];
        let entry = contest
            .submit(spec("Bruce", "Bat"), &mut photos)
            .await
            .unwrap();
        assert_eq!(entry.photos.len(), 1);
        assert!(entry.photos[0].ends_with("_1_bat.webp"));
        assert_eq!(uploads(&contest), entry.photos);
    }

    #[rocket::async_test]
    async fn only_disallowed_types_is_rejected() {
        let (_dir, contest) = temp_contest();
        let mut photos = [MemoryPhoto::named("notes.txt"), MemoryPhoto::named("run.exe")];
        let result = contest.submit(spec("Bruce", "Bat"), &mut photos).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(contest.document().await.unwrap().entries.is_empty());
        assert!(uploads(&contest).is_empty());
        assert!(contest.backups().list().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn ids_increase_with_each_submission() {
        let (_dir, contest) = temp_contest();
        for expected in ["1", "2", "3"] {
            let mut photos = [MemoryPhoto::named("pumpkin.png")];
            let entry = contest
                .submit(spec("Jack", "Pumpkin"), &mut photos)
                .await
                .unwrap();
            assert_eq!(entry.id, expected);
        }
        assert_eq!(uploads(&contest).len(), 3);
    }

    #[rocket::async_test]
    async fn long_filenames_are_stored() {
        let (_dir, contest) = temp_contest();
        let mut photos = [MemoryPhoto::named(&format!("{}.jpg", "a".repeat(240)))];
        let entry = contest
            .submit(spec("Morticia", "Vampire"), &mut photos)
            .await
            .unwrap();
        assert_eq!(entry.photos.len(), 1);
        assert!(entry.photos[0].len() <= 255);
        assert_eq!(uploads(&contest), entry.photos);
    }

    #[rocket::async_test]
    async fn failed_backup_does_not_fail_submission() {
        let (_dir, contest) = temp_contest();
        // A plain file where the backup directory should be.
        std::fs::write(contest.backups().dir(), b"not a directory").unwrap();

        let mut photos = [MemoryPhoto::named("ghost.gif")];
        let entry = contest
            .submit(spec("Casper", "Ghost"), &mut photos)
            .await
            .unwrap();

        let doc = contest.document().await.unwrap();
        assert_eq!(doc.entries, vec![entry]);
        assert_eq!(uploads(&contest).len(), 1);
        assert!(contest.backups().dir().is_file());
    }
}
