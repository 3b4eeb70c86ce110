mod support;

use pairchat::{CloseReason, Console, ConsoleExit, inbox};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex},
    time::timeout,
};

use support::{WAIT, connected_channel};

#[tokio::test]
async fn typed_lines_go_out_and_blank_ones_do_not() {
    let (channel, mut peer) = connected_channel().await;
    let (delivery, inbox) = inbox();
    channel.start_receiving(delivery).unwrap();

    let (mut keyboard, console_in) = duplex(1024);
    let (console_out, _screen) = duplex(4096);

    let console_channel = channel.clone();
    let console = tokio::spawn(async move {
        let mut console = Console::new(BufReader::new(console_in), console_out);
        console.run(&console_channel, inbox).await
    });

    keyboard.write_all(b"hello\n\n   \r\nworld\n").await.unwrap();

    assert_eq!(peer.read_line().await.as_deref(), Some("hello"));
    assert_eq!(peer.read_line().await.as_deref(), Some("world"));

    drop(keyboard);
    let exit = timeout(WAIT, console).await.unwrap().unwrap().unwrap();
    assert_eq!(exit, ConsoleExit::InputClosed);
}

#[tokio::test]
async fn inbound_messages_are_rendered_until_peer_leaves() {
    let (channel, mut peer) = connected_channel().await;
    let (delivery, inbox) = inbox();
    channel.start_receiving(delivery).unwrap();

    let (_keyboard, console_in) = duplex(1024);
    let (console_out, screen) = duplex(4096);
    let mut screen = BufReader::new(screen).lines();

    let console_channel = channel.clone();
    let console = tokio::spawn(async move {
        let mut console = Console::new(BufReader::new(console_in), console_out);
        console.run(&console_channel, inbox).await
    });

    peer.send_line("hey there").await;
    peer.send_line("bye").await;
    drop(peer);

    let mut shown = Vec::new();
    while let Some(line) = timeout(WAIT, screen.next_line()).await.unwrap().unwrap() {
        shown.push(line);
        if shown.len() == 3 {
            break;
        }
    }

    assert_eq!(shown[0], "peer> hey there");
    assert_eq!(shown[1], "peer> bye");
    assert_eq!(shown[2], "*** connection closed");

    let exit = timeout(WAIT, console).await.unwrap().unwrap().unwrap();
    assert_eq!(exit, ConsoleExit::ChannelClosed);
}

#[tokio::test]
async fn failed_send_ends_console_with_one_notice() {
    let (channel, peer) = connected_channel().await;

    // No inbound loop, so only the write path can notice the reset.
    let (_delivery, inbox) = inbox();

    peer.reset().await;

    let (mut keyboard, console_in) = duplex(1024);
    let (console_out, screen) = duplex(4096);
    let mut screen = BufReader::new(screen).lines();

    let console_channel = channel.clone();
    let console = tokio::spawn(async move {
        let mut console = Console::new(BufReader::new(console_in), console_out);
        console.run(&console_channel, inbox).await
    });

    keyboard.write_all(b"anyone there?\n").await.unwrap();

    let exit = timeout(WAIT, console).await.unwrap().unwrap().unwrap();
    assert_eq!(exit, ConsoleExit::ChannelClosed);
    assert_eq!(channel.close_reason(), Some(CloseReason::SendFailed));

    let mut shown = Vec::new();
    while let Some(line) = timeout(WAIT, screen.next_line()).await.unwrap().unwrap() {
        shown.push(line);
    }
    assert_eq!(shown, ["*** connection closed"]);
}
