use crate::model::{AccountId, FolderId, FolderStore, ItemRef, Platform};
use crate::organizer::{BlobStore, MemoryBlobStore, Organizer, STORE_KEY};

fn steam() -> Platform { Platform::new("steam") }

fn organizer() -> Organizer<MemoryBlobStore> { Organizer::load(MemoryBlobStore::new()) }

fn seeded(blob: &str) -> Organizer<MemoryBlobStore> {
    let mut store = MemoryBlobStore::new();
    store.set(STORE_KEY, blob).unwrap();
    Organizer::load(store)
}

fn acc(id: &str) -> ItemRef { ItemRef::account(id) }

fn fref(id: &str) -> ItemRef { ItemRef::folder(id) }

fn fid(id: &str) -> FolderId { FolderId::new(id) }

fn aid(id: &str) -> AccountId { AccountId::new(id) }

mod create {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_folder_lands_at_the_end_of_its_container() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1")]);
        let folder = org.create_folder(&steam(), "Work", None);

        assert_eq!(folder.name, "Work");
        assert_eq!(folder.platform, steam());
        assert_eq!(folder.parent_id, None);
        assert_eq!(org.get_folder(&folder.id), Some(&folder));
        assert_eq!(
            org.items_in_folder(None, &steam()),
            &[acc("A1"), ItemRef::Folder(folder.id.clone())]
        );
        assert_eq!(org.items_in_folder(Some(&folder.id), &steam()), &[] as &[ItemRef]);
    }

    #[test]
    fn nested_folder_lands_in_its_parent() {
        let mut org = organizer();
        let parent = org.create_folder(&steam(), "Outer", None).id;
        let child = org.create_folder(&steam(), "Inner", Some(&parent)).id;

        assert_eq!(org.items_in_folder(Some(&parent), &steam()), &[ItemRef::Folder(child.clone())]);
        assert_eq!(org.get_folder(&child).unwrap().parent_id, Some(parent));
    }

    #[test]
    fn cross_platform_parent_is_coerced_to_root() {
        let mut org = organizer();
        let epic_folder = org.create_folder(&Platform::new("epic"), "Epic", None).id;
        let id = org.create_folder(&steam(), "Steam", Some(&epic_folder)).id;

        assert_eq!(org.get_folder(&id).unwrap().parent_id, None);
        assert_eq!(org.items_in_folder(None, &steam()), &[ItemRef::Folder(id)]);
    }

    #[test]
    fn every_creation_flushes_once() {
        let mut org = organizer();
        org.create_folder(&steam(), "A", None);
        org.create_folder(&steam(), "B", None);
        assert_eq!(org.blob().writes(), 2);
    }
}

mod sync {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unplaced_accounts_are_appended_to_the_root() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);
        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A1"), acc("A2")]);
    }

    #[test]
    fn accounts_already_in_folders_are_not_duplicated() {
        let org = &mut seeded(
            r#"{"version":1,"folders":[{"id":"f","name":"F","parentId":null,"platform":"steam"}],
                "itemOrder":{"root:steam":[{"type":"folder","id":"f"}],
                             "f":[{"type":"account","id":"A1"}]}}"#,
        );
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);

        assert_eq!(org.items_in_folder(None, &steam()), &[fref("f"), acc("A2")]);
        assert_eq!(org.items_in_folder(Some(&fid("f")), &steam()), &[acc("A1")]);
    }

    #[test]
    fn stale_accounts_are_dropped_but_folders_survive() {
        let org = &mut seeded(
            r#"{"version":1,"folders":[{"id":"f","name":"F","parentId":null,"platform":"steam"}],
                "itemOrder":{"root:steam":[{"type":"account","id":"gone"},{"type":"folder","id":"f"}],
                             "f":[{"type":"account","id":"alsogone"},{"type":"account","id":"A1"}]}}"#,
        );
        org.sync_accounts(&steam(), &[aid("A1")]);

        assert_eq!(org.items_in_folder(None, &steam()), &[fref("f")]);
        assert_eq!(org.items_in_folder(Some(&fid("f")), &steam()), &[acc("A1")]);
    }

    #[test]
    fn other_platforms_are_untouched() {
        let mut org = organizer();
        org.sync_accounts(&Platform::new("epic"), &[aid("E1")]);
        org.sync_accounts(&steam(), &[aid("A1")]);

        assert_eq!(org.items_in_folder(None, &Platform::new("epic")), &[acc("E1")]);
        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A1")]);
    }

    #[test]
    fn syncing_twice_is_idempotent() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);
        let first = org.blob().get(STORE_KEY).unwrap().unwrap();

        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);
        let second = org.blob().get(STORE_KEY).unwrap().unwrap();

        assert_eq!(second, first);
    }

    #[test]
    fn duplicate_ids_in_the_account_list_are_added_once() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1"), aid("A1")]);
        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A1")]);
    }
}

mod moving {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn account_moves_from_root_into_a_folder() {
        let mut org = organizer();
        let work = org.create_folder(&steam(), "Work", None).id;
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);
        org.move_item(&acc("A1"), Some(&work), &steam(), None);

        assert_eq!(
            org.items_in_folder(None, &steam()),
            &[ItemRef::Folder(work.clone()), acc("A2")]
        );
        assert_eq!(org.items_in_folder(Some(&work), &steam()), &[acc("A1")]);
    }

    #[test]
    fn index_is_clamped_to_the_destination_length() {
        let mut org = organizer();
        let work = org.create_folder(&steam(), "Work", None).id;
        org.sync_accounts(&steam(), &[aid("A1")]);
        org.move_item(&acc("A1"), Some(&work), &steam(), Some(99));

        assert_eq!(org.items_in_folder(Some(&work), &steam()), &[acc("A1")]);
    }

    #[test]
    fn move_within_a_container_indexes_the_list_after_removal() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2"), aid("A3")]);
        org.move_item(&acc("A1"), None, &steam(), Some(2));

        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A2"), acc("A3"), acc("A1")]);
    }

    #[test]
    fn folder_moves_update_the_parent_link() {
        let mut org = organizer();
        let outer = org.create_folder(&steam(), "Outer", None).id;
        let inner = org.create_folder(&steam(), "Inner", None).id;
        org.move_item(&ItemRef::Folder(inner.clone()), Some(&outer), &steam(), None);

        assert_eq!(org.get_folder(&inner).unwrap().parent_id, Some(outer.clone()));
        assert_eq!(org.items_in_folder(None, &steam()), &[ItemRef::Folder(outer.clone())]);
        assert_eq!(org.items_in_folder(Some(&outer), &steam()), &[ItemRef::Folder(inner)]);
        assert_eq!(org.store().validate(), Vec::<String>::new());
    }

    #[test]
    fn folder_cannot_move_into_itself_or_a_descendant() {
        let mut org = organizer();
        let outer = org.create_folder(&steam(), "Outer", None).id;
        let inner = org.create_folder(&steam(), "Inner", Some(&outer)).id;
        let writes = org.blob().writes();

        org.move_item(&ItemRef::Folder(outer.clone()), Some(&outer), &steam(), None);
        org.move_item(&ItemRef::Folder(outer.clone()), Some(&inner), &steam(), None);

        assert_eq!(org.blob().writes(), writes);
        assert_eq!(org.get_folder(&outer).unwrap().parent_id, None);
    }

    #[test]
    fn moving_to_a_missing_folder_changes_nothing() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1")]);
        let writes = org.blob().writes();

        org.move_item(&acc("A1"), Some(&fid("ghost")), &steam(), None);

        assert_eq!(org.blob().writes(), writes);
        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A1")]);
    }

    #[test]
    fn an_unplaced_account_is_still_inserted() {
        let mut org = organizer();
        let work = org.create_folder(&steam(), "Work", None).id;
        org.move_item(&acc("A9"), Some(&work), &steam(), None);

        assert_eq!(org.items_in_folder(Some(&work), &steam()), &[acc("A9")]);
    }

    #[test]
    fn same_account_id_on_another_platform_is_left_alone() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1")]);
        org.sync_accounts(&Platform::new("epic"), &[aid("A1")]);
        let work = org.create_folder(&steam(), "Work", None).id;
        org.move_item(&acc("A1"), Some(&work), &steam(), None);

        assert_eq!(org.items_in_folder(None, &Platform::new("epic")), &[acc("A1")]);
    }
}

mod reorder {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn container_lists_are_replaced_verbatim() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2"), aid("A3")]);
        org.reorder_items(None, &steam(), vec![acc("A3"), acc("A1"), acc("A2")]);

        assert_eq!(org.items_in_folder(None, &steam()), &[acc("A3"), acc("A1"), acc("A2")]);
    }

    #[test]
    fn reordering_an_unknown_folder_changes_nothing() {
        let mut org = organizer();
        org.sync_accounts(&steam(), &[aid("A1")]);
        let writes = org.blob().writes();

        org.reorder_items(Some(&fid("ghost")), &steam(), vec![acc("A1")]);

        assert_eq!(org.blob().writes(), writes);
    }
}

mod delete {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn contents_take_the_folder_place_in_the_parent_list() {
        let org = &mut seeded(
            r#"{"version":1,"folders":[{"id":"f","name":"F","parentId":null,"platform":"steam"}],
                "itemOrder":{"root:steam":[{"type":"account","id":"x"},{"type":"folder","id":"f"},{"type":"account","id":"y"}],
                             "f":[{"type":"account","id":"a"},{"type":"account","id":"b"},{"type":"account","id":"c"}]}}"#,
        );
        org.delete_folder(&fid("f"));

        assert_eq!(
            org.items_in_folder(None, &steam()),
            &[acc("x"), acc("a"), acc("b"), acc("c"), acc("y")]
        );
        assert_eq!(org.get_folder(&fid("f")), None);
        assert_eq!(org.store().validate(), Vec::<String>::new());
    }

    #[test]
    fn nested_folders_dissolve_with_their_accounts_at_the_end() {
        let org = &mut seeded(
            r#"{"version":1,"folders":[
                    {"id":"f","name":"F","parentId":null,"platform":"steam"},
                    {"id":"g","name":"G","parentId":"f","platform":"steam"}],
                "itemOrder":{"root:steam":[{"type":"account","id":"x"},{"type":"folder","id":"f"},{"type":"account","id":"y"}],
                             "f":[{"type":"account","id":"a"},{"type":"folder","id":"g"}],
                             "g":[{"type":"account","id":"b"}]}}"#,
        );
        org.delete_folder(&fid("f"));

        assert_eq!(org.items_in_folder(None, &steam()), &[acc("x"), acc("a"), acc("y"), acc("b")]);
        assert_eq!(org.get_folder(&fid("g")), None);
        assert_eq!(org.store().validate(), Vec::<String>::new());
    }

    #[test]
    fn deleting_a_nested_folder_lifts_into_its_parent() {
        let org = &mut seeded(
            r#"{"version":1,"folders":[
                    {"id":"p","name":"P","parentId":null,"platform":"steam"},
                    {"id":"c","name":"C","parentId":"p","platform":"steam"}],
                "itemOrder":{"root:steam":[{"type":"folder","id":"p"}],
                             "p":[{"type":"folder","id":"c"},{"type":"account","id":"A2"}],
                             "c":[{"type":"account","id":"A1"}]}}"#,
        );
        org.delete_folder(&fid("c"));

        assert_eq!(org.items_in_folder(Some(&fid("p")), &steam()), &[acc("A1"), acc("A2")]);
        assert_eq!(org.store().validate(), Vec::<String>::new());
    }

    #[test]
    fn deleting_a_missing_folder_leaves_the_blob_byte_identical() {
        let blob = r#"{"version":1,"folders":[],"itemOrder":{"root:steam":[{"type":"account","id":"A1"}]}}"#;
        let org = &mut seeded(blob);
        org.delete_folder(&fid("ghost"));

        assert_eq!(org.blob().get(STORE_KEY).unwrap().as_deref(), Some(blob));
        assert_eq!(org.blob().writes(), 1);
    }
}

mod rename {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn renames_persist() {
        let mut org = organizer();
        let id = org.create_folder(&steam(), "Work", None).id;
        org.rename_folder(&id, "Play");

        assert_eq!(org.get_folder(&id).unwrap().name, "Play");
        assert_eq!(org.blob().writes(), 2);
    }

    #[test]
    fn renaming_a_missing_folder_changes_nothing() {
        let mut org = organizer();
        let writes = org.blob().writes();
        org.rename_folder(&fid("ghost"), "Play");
        assert_eq!(org.blob().writes(), writes);
    }
}

mod path {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn path_runs_from_the_root_down() {
        let mut org = organizer();
        let a = org.create_folder(&steam(), "A", None).id;
        let b = org.create_folder(&steam(), "B", Some(&a)).id;
        let c = org.create_folder(&steam(), "C", Some(&b)).id;

        let path: Vec<&FolderId> = org.folder_path(Some(&c)).iter().map(|f| &f.id).collect();
        assert_eq!(path, vec![&a, &b, &c]);
    }

    #[test]
    fn unknown_ids_have_an_empty_path() {
        let org = organizer();
        assert!(org.folder_path(Some(&fid("ghost"))).is_empty());
        assert!(org.folder_path(None).is_empty());
    }
}

mod round_trip {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn a_mutated_store_reloads_identically() {
        let mut org = organizer();
        let work = org.create_folder(&steam(), "Work", None).id;
        org.create_folder(&steam(), "Alts", Some(&work));
        org.sync_accounts(&steam(), &[aid("A1"), aid("A2")]);
        org.move_item(&acc("A1"), Some(&work), &steam(), Some(0));

        let blob = org.blob().get(STORE_KEY).unwrap().unwrap();
        let reloaded = seeded(&blob);

        assert_eq!(reloaded.store(), org.store());
        assert_eq!(reloaded.store().to_blob().unwrap(), blob);
        assert_eq!(org.store().validate(), Vec::<String>::new());
    }

    #[test]
    fn loading_never_writes() {
        let mut blob = MemoryBlobStore::new();
        blob.set(STORE_KEY, r#"{"folders":[{"id":"f","name":"F","platform":"steam"}]}"#).unwrap();
        let org = Organizer::load(blob);

        // Sanitizer repairs are held in memory until the next mutation.
        assert_eq!(org.blob().writes(), 1);
        assert!(org.store().validate().is_empty());
        assert_eq!(org.store(), &FolderStore::from_blob(
            r#"{"folders":[{"id":"f","name":"F","platform":"steam"}]}"#,
        ));
    }
}
