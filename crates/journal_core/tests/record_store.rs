use journal_core::{
    Author, AuthorPatch, BlobRepository, IdKind, LoadSource, MemoryBlobRepository, Paper,
    PaperPatch, PaperValidationError, RecordStore, RepoError, RepoResult, StoreError,
    StoreOptions, Volume, VolumeDeletion, VolumePatch,
};

fn empty_store() -> RecordStore<MemoryBlobRepository> {
    let options = StoreOptions {
        seed_when_empty: false,
        ..StoreOptions::default()
    };
    RecordStore::open(MemoryBlobRepository::new(), options)
}

fn seeded_store() -> RecordStore<MemoryBlobRepository> {
    RecordStore::open(MemoryBlobRepository::new(), StoreOptions::default())
}

fn volume(id: &str, issue_number: u32) -> Volume {
    Volume::new(id, format!("Volume {id}"), issue_number, 2024, 3, "Issue description")
}

fn paper(id: &str, volume_id: &str) -> Paper {
    let mut paper = Paper::new(
        id,
        format!("Paper {id}"),
        "An abstract",
        volume_id,
        "2024-03-01",
    );
    paper.authors.push(Author::new("a1", "Dr. Jane Smith"));
    paper
}

fn paper_ids(papers: &[Paper]) -> Vec<&str> {
    papers.iter().map(|paper| paper.id.as_str()).collect()
}

#[test]
fn add_and_get_paper() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_paper(paper("p1", "v1")).unwrap();

    let loaded = store.get_paper("p1").unwrap();
    assert_eq!(loaded.title, "Paper p1");
    assert_eq!(loaded.volume_id, "v1");
    assert_eq!(paper_ids(store.papers()), vec!["p1"]);
}

#[test]
fn add_paper_rejects_duplicate_id() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_paper(paper("p1", "v1")).unwrap();

    let err = store.add_paper(paper("p1", "v1")).unwrap_err();
    assert_eq!(
        err,
        StoreError::DuplicateId {
            kind: IdKind::Paper,
            id: "p1".to_string()
        }
    );
    assert_eq!(store.papers().len(), 1);
}

#[test]
fn add_paper_requires_existing_volume() {
    let mut store = empty_store();
    let err = store.add_paper(paper("p1", "missing")).unwrap_err();
    assert_eq!(err, StoreError::UnknownVolume("missing".to_string()));
    assert!(store.papers().is_empty());
}

#[test]
fn add_paper_rejects_invalid_record() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();

    let mut invalid = paper("p1", "v1");
    invalid.authors.clear();
    let err = store.add_paper(invalid).unwrap_err();
    assert_eq!(
        err,
        StoreError::InvalidPaper(PaperValidationError::MissingAuthors)
    );
}

#[test]
fn update_paper_merges_only_given_fields() {
    let mut store = seeded_store();
    let before = store.get_paper("p1").unwrap().clone();

    let patch = PaperPatch {
        title: Some("New Title".to_string()),
        ..PaperPatch::default()
    };
    assert!(store.update_paper("p1", &patch).unwrap());

    let after = store.get_paper("p1").unwrap();
    assert_eq!(after.title, "New Title");
    assert_eq!(after.abstract_text, before.abstract_text);
    assert_eq!(after.authors, before.authors);
    assert_eq!(after.keywords, before.keywords);
    assert_eq!(
        serde_json::to_string(&after.authors).unwrap(),
        serde_json::to_string(&before.authors).unwrap()
    );
    assert_eq!(after.references, before.references);
    assert_eq!(after.volume_id, before.volume_id);
    assert_eq!(after.image, before.image);
}

#[test]
fn update_unknown_paper_is_a_no_op() {
    let mut store = seeded_store();
    let before = store.papers().to_vec();

    let patch = PaperPatch {
        title: Some("Ghost".to_string()),
        ..PaperPatch::default()
    };
    assert!(!store.update_paper("nope", &patch).unwrap());
    assert_eq!(store.papers(), before.as_slice());
}

#[test]
fn update_paper_rejects_invalid_merge_and_keeps_state() {
    let mut store = seeded_store();
    let before = store.get_paper("p1").unwrap().clone();

    let blank_title = PaperPatch {
        title: Some("  ".to_string()),
        ..PaperPatch::default()
    };
    let err = store.update_paper("p1", &blank_title).unwrap_err();
    assert_eq!(err, StoreError::InvalidPaper(PaperValidationError::EmptyTitle));

    let orphan = PaperPatch {
        volume_id: Some("v404".to_string()),
        ..PaperPatch::default()
    };
    let err = store.update_paper("p1", &orphan).unwrap_err();
    assert_eq!(err, StoreError::UnknownVolume("v404".to_string()));

    assert_eq!(store.get_paper("p1").unwrap(), &before);
}

#[test]
fn update_paper_can_move_between_existing_volumes() {
    let mut store = seeded_store();
    let patch = PaperPatch {
        volume_id: Some("v2".to_string()),
        ..PaperPatch::default()
    };
    assert!(store.update_paper("p1", &patch).unwrap());
    assert_eq!(paper_ids(&store.get_papers_by_volume("v2")), vec!["p1", "p2"]);
    assert!(store.get_papers_by_volume("v1").is_empty());
}

#[test]
fn delete_paper_is_idempotent() {
    let mut store = seeded_store();
    assert!(store.delete_paper("p2"));
    let after_first = store.papers().to_vec();

    assert!(!store.delete_paper("p2"));
    assert_eq!(store.papers(), after_first.as_slice());
    assert_eq!(paper_ids(store.papers()), vec!["p1", "p3"]);
}

#[test]
fn add_volume_rejects_duplicate_id_and_invalid_month() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();

    let err = store.add_volume(volume("v1", 2)).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId { kind: IdKind::Volume, .. }));

    let mut bad = volume("v2", 2);
    bad.month = 0;
    assert!(matches!(
        store.add_volume(bad).unwrap_err(),
        StoreError::InvalidVolume(_)
    ));
    assert_eq!(store.volumes().len(), 1);
}

#[test]
fn duplicate_issue_numbers_are_permitted_by_default() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_volume(volume("v2", 1)).unwrap();
    assert_eq!(store.volumes().len(), 2);
}

#[test]
fn unique_issue_numbers_can_be_enforced() {
    let options = StoreOptions {
        seed_when_empty: false,
        enforce_unique_issue_numbers: true,
    };
    let mut store = RecordStore::open(MemoryBlobRepository::new(), options);
    assert!(store.options().enforce_unique_issue_numbers);
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_volume(volume("v2", 2)).unwrap();

    assert_eq!(
        store.add_volume(volume("v3", 1)).unwrap_err(),
        StoreError::DuplicateIssueNumber(1)
    );

    let clash = VolumePatch {
        issue_number: Some(1),
        ..VolumePatch::default()
    };
    assert_eq!(
        store.update_volume("v2", &clash).unwrap_err(),
        StoreError::DuplicateIssueNumber(1)
    );

    let unchanged = VolumePatch {
        issue_number: Some(2),
        title: Some("Renamed".to_string()),
        ..VolumePatch::default()
    };
    assert!(store.update_volume("v2", &unchanged).unwrap());
}

#[test]
fn update_volume_merges_and_ignores_unknown_ids() {
    let mut store = seeded_store();
    let before = store.get_volume("v1").unwrap().clone();

    let patch = VolumePatch {
        description: Some("Rewritten".to_string()),
        image: Some(Some("/cover.png".to_string())),
        ..VolumePatch::default()
    };
    assert!(store.update_volume("v1", &patch).unwrap());

    let after = store.get_volume("v1").unwrap();
    assert_eq!(after.description, "Rewritten");
    assert_eq!(after.image.as_deref(), Some("/cover.png"));
    assert_eq!(after.title, before.title);
    assert_eq!(after.sort_key(), before.sort_key());

    assert!(!store.update_volume("v404", &patch).unwrap());
}

#[test]
fn delete_volume_cascades_to_its_papers() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_volume(volume("v2", 2)).unwrap();
    store.add_paper(paper("p1", "v1")).unwrap();
    store.add_paper(paper("p2", "v2")).unwrap();
    store.add_paper(paper("p3", "v1")).unwrap();

    let deletion = store.delete_volume("v1");
    assert_eq!(
        deletion,
        VolumeDeletion {
            volume_removed: true,
            papers_removed: 2
        }
    );
    assert!(store.get_volume("v1").is_none());
    assert!(store.get_papers_by_volume("v1").is_empty());
    assert!(store.papers().iter().all(|paper| paper.volume_id != "v1"));
    assert_eq!(paper_ids(store.papers()), vec!["p2"]);
}

#[test]
fn referential_integrity_holds_for_every_seed_volume() {
    let volume_ids = seeded_store()
        .volumes()
        .iter()
        .map(|volume| volume.id.clone())
        .collect::<Vec<_>>();

    for volume_id in volume_ids {
        let mut store = seeded_store();
        store.delete_volume(&volume_id);
        assert!(store.get_papers_by_volume(&volume_id).is_empty());
        assert!(store.papers().iter().all(|paper| paper.volume_id != volume_id));
    }
}

#[test]
fn delete_unknown_volume_is_a_no_op() {
    let mut store = seeded_store();
    assert_eq!(store.delete_volume("v404"), VolumeDeletion::default());
    assert_eq!(store.volumes().len(), 3);
    assert_eq!(store.papers().len(), 3);
}

#[test]
fn get_papers_by_volume_preserves_insertion_order() {
    let mut store = empty_store();
    store.add_volume(volume("v1", 1)).unwrap();
    store.add_volume(volume("v2", 2)).unwrap();
    for (id, volume_id) in [("p3", "v1"), ("p1", "v2"), ("p2", "v1")] {
        store.add_paper(paper(id, volume_id)).unwrap();
    }

    assert_eq!(paper_ids(&store.get_papers_by_volume("v1")), vec!["p3", "p2"]);
    assert!(store.get_papers_by_volume("v9").is_empty());
}

#[test]
fn returned_papers_are_copies() {
    let store = seeded_store();
    let mut copies = store.get_papers_by_volume("v1");
    copies[0].title = "Mutated outside".to_string();

    assert_eq!(
        store.get_paper("p1").unwrap().title,
        "Quantum Error Correction in NISQ Devices"
    );
}

#[test]
fn propagate_author_edit_updates_every_copy() {
    let mut store = seeded_store();
    let mut second = paper("p9", "v2");
    second.authors = vec![
        Author::new("a2", "Someone Else"),
        store.get_paper("p1").unwrap().authors[0].clone(),
    ];
    store.add_paper(second).unwrap();

    let patch = AuthorPatch {
        affiliation: Some("ETH Zurich".to_string()),
        ..AuthorPatch::default()
    };
    assert_eq!(store.propagate_author_edit("a1", &patch).unwrap(), 2);

    for paper_id in ["p1", "p9"] {
        let paper = store.get_paper(paper_id).unwrap();
        let author = paper.authors.iter().find(|author| author.id == "a1").unwrap();
        assert_eq!(author.affiliation, "ETH Zurich");
        assert_eq!(author.name, "Dr. Jane Smith");
    }
    assert_eq!(
        store.get_paper("p9").unwrap().authors[0].name,
        "Someone Else"
    );

    assert_eq!(store.propagate_author_edit("a1", &patch).unwrap(), 0);
}

#[test]
fn propagate_author_edit_rejects_blank_name() {
    let mut store = seeded_store();
    let patch = AuthorPatch {
        name: Some(" ".to_string()),
        ..AuthorPatch::default()
    };
    assert!(matches!(
        store.propagate_author_edit("a1", &patch).unwrap_err(),
        StoreError::InvalidAuthor(_)
    ));
    assert_eq!(store.get_paper("p1").unwrap().authors[0].name, "Dr. Jane Smith");
}

#[test]
fn clear_empties_both_collections() {
    let mut store = seeded_store();
    store.clear();
    assert!(store.papers().is_empty());
    assert!(store.volumes().is_empty());

    let reopened = RecordStore::open(store.into_repository(), StoreOptions::default());
    assert_eq!(reopened.load_source(), LoadSource::Persisted);
    assert!(reopened.papers().is_empty());
}

#[test]
fn export_snapshot_contains_both_collections() {
    let store = seeded_store();
    let exported: serde_json::Value =
        serde_json::from_str(&store.export_snapshot().unwrap()).unwrap();

    assert_eq!(exported["papers"].as_array().unwrap().len(), 3);
    assert_eq!(exported["volumes"].as_array().unwrap().len(), 3);
    assert_eq!(exported["papers"][0]["volumeId"], "v1");
    assert_eq!(exported["volumes"][0]["issueNumber"], 1);
}

/// Accepts reads, fails every write.
#[derive(Default)]
struct ReadOnlyRepository {
    inner: MemoryBlobRepository,
}

impl BlobRepository for ReadOnlyRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&mut self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::SchemaNotReady {
            found: 0,
            expected: 1,
        })
    }

    fn remove(&mut self, _key: &str) -> RepoResult<bool> {
        Ok(false)
    }
}

#[test]
fn persistence_failures_do_not_reach_callers() {
    let mut store = RecordStore::open(ReadOnlyRepository::default(), StoreOptions::default());
    assert_eq!(store.load_source(), LoadSource::Seed);

    store.add_volume(volume("v9", 9)).unwrap();
    store.add_paper(paper("p9", "v9")).unwrap();
    assert_eq!(store.delete_volume("v1").papers_removed, 1);

    assert!(store.get_paper("p9").is_some());
    assert!(store.get_volume("v1").is_none());
    assert!(store.repository().inner.is_empty());
}

/// Counts blob writes.
#[derive(Default)]
struct CountingRepository {
    inner: MemoryBlobRepository,
    writes: usize,
}

impl BlobRepository for CountingRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.writes += 1;
        self.inner.put(key, value)
    }

    fn remove(&mut self, key: &str) -> RepoResult<bool> {
        self.inner.remove(key)
    }
}

#[test]
fn empty_patches_match_without_writing() {
    let mut store = RecordStore::open(CountingRepository::default(), StoreOptions::default());
    let writes_after_open = store.repository().writes;

    assert!(store.update_paper("p1", &PaperPatch::default()).unwrap());
    assert!(!store.update_paper("p404", &PaperPatch::default()).unwrap());
    assert!(store.update_volume("v1", &VolumePatch::default()).unwrap());
    assert_eq!(
        store
            .propagate_author_edit("a1", &AuthorPatch::default())
            .unwrap(),
        0
    );
    assert_eq!(store.repository().writes, writes_after_open);

    let retitle = PaperPatch {
        title: Some("Retitled".to_string()),
        ..PaperPatch::default()
    };
    assert!(store.update_paper("p1", &retitle).unwrap());
    assert_eq!(store.repository().writes, writes_after_open + 1);
}
