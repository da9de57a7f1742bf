//! Torrent library persistence through the command surface

use seedscope_core::config::SeedscopeConfig;
use seedscope_core::{Commands, JsonFileStore, TorrentStore};
use tempfile::tempdir;

const FIRST: &[u8] = b"d8:announce8:http://a4:infod6:lengthi1024e4:name5:first12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
const SECOND: &[u8] = b"d4:infod5:filesld6:lengthi3e4:pathl1:x5:y.txteee4:name6:second12:piece lengthi16384e6:pieces20:bbbbbbbbbbbbbbbbbbbbee";

#[tokio::test]
async fn test_library_persists_across_store_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    let commands = Commands::new(SeedscopeConfig::for_testing());

    let store = JsonFileStore::new(&path);
    let first = commands.import_torrent(FIRST, &store).await.unwrap();
    let second = commands.import_torrent(SECOND, &store).await.unwrap();
    assert_eq!(second.info.files.as_ref().unwrap()[0].path, "x/y.txt");

    let reopened = JsonFileStore::new(&path);
    let library = commands.library(&reopened).await.unwrap();
    assert_eq!(library, vec![first.clone(), second]);

    assert!(commands.remove_torrent(&reopened, first.info_hash).await.unwrap());
    let library = reopened.load().await.unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].info.name, "second");
}

#[tokio::test]
async fn test_rejected_import_leaves_library_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("library.json");
    let commands = Commands::new(SeedscopeConfig::for_testing());
    let store = JsonFileStore::new(&path);

    commands.import_torrent(FIRST, &store).await.unwrap();
    let before = tokio::fs::read(&path).await.unwrap();

    let result = commands.import_torrent(b"d4:infodee", &store).await;
    assert!(result.is_err());

    let after = tokio::fs::read(&path).await.unwrap();
    assert_eq!(before, after);
}
