//! Module `menu`
//!
//! Renders menu responses: single items, info and error lines, and raw
//! directory listings. A line that can't be sent is logged and counted but
//! does not stop the rest of the menu.

use log::{error, info, warn};
use std::path::Path;
use tokio::io::AsyncWrite;

use crate::client::Session;
use crate::error::TransferError;
use crate::protocol::GopherItem;
use crate::protocol::responses::{
    MAX_LISTING_NAME, MENU_TERMINATOR, TYPE_DIRECTORY, TYPE_ERROR, TYPE_FILE, TYPE_INFO,
};
use crate::storage::list_directory;

/// Serializes `item` for this session and sends it.
pub async fn send_item<W>(session: &mut Session<W>, item: &GopherItem) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    if !item.is_informational() && !item.is_link() {
        warn!(
            "Item '{}' of type {} has no usable selector, host or port",
            item.name, item.item_type
        );
    }

    let line = match item.serialize(session.selector(), session.config().max_line_length) {
        Ok(line) => line,
        Err(e) => {
            warn!("{}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = session.send(line.as_bytes()).await {
        error!("Failed to send entry item line: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Sends an info (`i`) line.
pub async fn send_info<W>(session: &mut Session<W>, text: &str) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    send_item(session, &GopherItem::simple(TYPE_INFO, text)).await
}

/// Sends an error (`3`) line.
pub async fn send_error<W>(session: &mut Session<W>, text: &str) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    send_item(session, &GopherItem::simple(TYPE_ERROR, text)).await
}

/// Sends the line closing a menu response.
pub async fn send_terminator<W>(session: &mut Session<W>) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    session.send(MENU_TERMINATOR).await?;
    session.flush().await
}

/// Lists the directory at `path` as a menu.
///
/// With `with_header`, the listing is preceded by a `[<selector>]:` line and
/// a blank line.
pub async fn send_dir<W>(
    session: &mut Session<W>,
    path: &Path,
    with_header: bool,
) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    let entries = match list_directory(path).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to open directory {} for listing: {}", path.display(), e);
            return Err(TransferError::DirectoryReadFailed(path.to_path_buf(), e));
        }
    };

    let mut failed = 0;

    if with_header {
        let header = format!("[{}]:", session.selector());
        for text in [header.as_str(), ""] {
            if send_info(session, text).await.is_err() {
                failed += 1;
            }
        }
    }

    let hostname = session.config().default_hostname.clone();
    let port = session.config().default_port;

    for entry in &entries {
        let (item_type, suffix) = if entry.is_dir {
            (TYPE_DIRECTORY, '/')
        } else {
            (TYPE_FILE, ' ')
        };
        let name = listing_name(&entry.name, suffix);
        let item = GopherItem::new(item_type, name, entry.name.as_str(), hostname.as_str(), port);

        if send_item(session, &item).await.is_err() {
            failed += 1;
        }
    }

    info!(
        "Listed directory {} - {} entries",
        path.display(),
        entries.len()
    );

    if failed > 0 {
        return Err(TransferError::Incomplete { failed });
    }
    Ok(())
}

/// Display name of a listing entry, capped at `MAX_LISTING_NAME` bytes.
fn listing_name(name: &str, suffix: char) -> String {
    let mut display = format!("{}{}", name, suffix);
    if display.len() > MAX_LISTING_NAME {
        let mut end = MAX_LISTING_NAME;
        while !display.is_char_boundary(end) {
            end -= 1;
        }
        display.truncate(end);
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::fs;
    use std::sync::Arc;

    fn session(selector: &str) -> Session<Vec<u8>> {
        Session::new(Vec::new(), selector, Arc::new(ServerConfig::default()))
    }

    fn output(session: Session<Vec<u8>>) -> String {
        String::from_utf8(session.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn info_and_error_lines() {
        let mut session = session("");
        send_info(&mut session, "Welcome").await.unwrap();
        send_error(&mut session, "Oops").await.unwrap();
        send_terminator(&mut session).await.unwrap();
        assert_eq!(
            output(session),
            "iWelcome\t\tnull.host\t0\r\n3Oops\t\tnull.host\t0\r\n.\r\n"
        );
    }

    #[tokio::test]
    async fn oversized_item_is_skipped() {
        let mut session = session("");
        let item = GopherItem::new('0', "n".repeat(400), "x", "localhost", 70);
        assert!(matches!(
            send_item(&mut session, &item).await,
            Err(TransferError::Item(_))
        ));
        send_info(&mut session, "after").await.unwrap();
        assert_eq!(output(session), "iafter\t\tnull.host\t0\r\n");
    }

    #[tokio::test]
    async fn undialable_link_is_still_sent() {
        let mut session = session("");
        let item = GopherItem::new('1', "Nowhere", "", "localhost", 70);
        send_item(&mut session, &item).await.unwrap();
        assert_eq!(output(session), "1Nowhere\t\tlocalhost\t70\r\n");
    }

    #[tokio::test]
    async fn directory_listing_with_header() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt"), "a").unwrap();
        fs::write(root.path().join(".secret"), "s").unwrap();
        fs::write(root.path().join("gophermap"), "iHi").unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();

        let mut session = session("/docs");
        send_dir(&mut session, root.path(), true).await.unwrap();
        assert_eq!(
            output(session),
            concat!(
                "i[/docs]:\t\tnull.host\t0\r\n",
                "i\t\tnull.host\t0\r\n",
                "0a.txt \t/docs/a.txt\tlocalhost\t70\r\n",
                "1sub/\t/docs/sub\tlocalhost\t70\r\n",
            )
        );
    }

    #[tokio::test]
    async fn directory_listing_without_header_at_root() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt"), "a").unwrap();

        let mut session = session("");
        send_dir(&mut session, root.path(), false).await.unwrap();
        assert_eq!(output(session), "0a.txt \ta.txt\tlocalhost\t70\r\n");
    }

    #[tokio::test]
    async fn listing_of_missing_directory_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut session = session("/nope");
        let result = send_dir(&mut session, &root.path().join("nope"), true).await;
        assert!(matches!(result, Err(TransferError::DirectoryReadFailed(..))));
        assert!(output(session).is_empty());
    }

    #[tokio::test]
    async fn listing_continues_past_failed_items() {
        let root = tempfile::tempdir().unwrap();
        let long_name = "l".repeat(200);
        fs::write(root.path().join(&long_name), "x").unwrap();
        fs::write(root.path().join("short"), "x").unwrap();

        // The display name is capped, but the joined selector still overflows.
        let mut session = session("/s");
        let result = send_dir(&mut session, root.path(), false).await;
        assert!(matches!(result, Err(TransferError::Incomplete { failed: 1 })));
        assert_eq!(output(session), "0short \t/s/short\tlocalhost\t70\r\n");
    }

    #[test]
    fn listing_names_are_capped() {
        assert_eq!(listing_name("docs", '/'), "docs/");
        assert_eq!(listing_name("a.txt", ' '), "a.txt ");
        assert_eq!(listing_name(&"x".repeat(80), ' ').len(), MAX_LISTING_NAME);
        assert_eq!(listing_name(&"é".repeat(40), '/').len(), MAX_LISTING_NAME);
    }
}
