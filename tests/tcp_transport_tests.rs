use std::sync::Arc;

use sea_battle::{
    BattleApi, Identity, Message, Point, SessionHub, Skeleton, Stub, TcpTransport, Transport,
    EXPECTED_CELLS, PROTOCOL_VERSION,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;

fn column(x: u32) -> Vec<Point> {
    (0..EXPECTED_CELLS as u32).map(|y| Point::new(x, y)).collect()
}

async fn spawn_server(
    hub: Arc<SessionHub>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<anyhow::Result<()>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let transport = TcpTransport::with_timeout(socket, Duration::from_secs(5));
        let mut skeleton = Skeleton::new(hub, transport);
        skeleton.run().await
    });
    Ok((addr, server))
}

#[tokio::test(flavor = "multi_thread")]
async fn stub_skeleton_tcp() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(Arc::clone(&hub)).await?;
    let (a, b) = (Identity::from(1u64), Identity::from(2u64));

    let transport = TcpTransport::connect(addr).await?;
    let mut stub = Stub::new(transport, a);
    let session = stub.create_session().await?;
    let mut seat = stub.bind(session);
    seat.register_board(column(0)).await?;

    // Second player joins in-process on the same hub.
    hub.register_board(session, b, &column(1)).await?;
    assert!(seat.is_started().await?);
    assert_eq!(seat.active_player().await?, a);

    let outcome = seat.take_shot(Point::new(1, 3)).await?;
    assert!(outcome.report.hit);
    assert_eq!(outcome.report.defender, b);
    assert_eq!(seat.hit_count(b).await?, 1);

    drop(seat);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_length_frame_is_rejected() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    raw.write_all(&0u32.to_be_bytes()).await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Invalid message length"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_frame_is_rejected() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    raw.write_all(&u32::MAX.to_be_bytes()).await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Message too large"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn garbage_body_is_rejected() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    raw.write_all(&4u32.to_be_bytes()).await?;
    raw.write_all(&[0xff, 0xff, 0xff, 0xff]).await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Deserialization error"));
    Ok(())
}

async fn write_frame(raw: &mut TcpStream, msg: &Message) -> anyhow::Result<()> {
    let data = bincode::serialize(msg)?;
    raw.write_all(&(data.len() as u32).to_be_bytes()).await?;
    raw.write_all(&data).await?;
    Ok(())
}

async fn read_frame(raw: &mut TcpStream) -> anyhow::Result<Message> {
    let mut len = [0u8; 4];
    raw.read_exact(&mut len).await?;
    let mut body = vec![0u8; u32::from_be_bytes(len) as usize];
    raw.read_exact(&mut body).await?;
    Ok(bincode::deserialize(&body)?)
}

#[tokio::test(flavor = "multi_thread")]
async fn garbage_after_handshake_fails_the_connection() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    write_frame(&mut raw, &Message::Hello { version: PROTOCOL_VERSION }).await?;
    assert_eq!(
        read_frame(&mut raw).await?,
        Message::HelloAck { version: PROTOCOL_VERSION }
    );

    raw.write_all(&4u32.to_be_bytes()).await?;
    raw.write_all(&[0xff, 0xff, 0xff, 0xff]).await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Deserialization error"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_frame_after_handshake_fails_the_connection() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    write_frame(&mut raw, &Message::Hello { version: PROTOCOL_VERSION }).await?;
    read_frame(&mut raw).await?;

    raw.write_all(&u32::MAX.to_be_bytes()).await?;
    let err = server.await?.unwrap_err();
    assert!(err.to_string().contains("Message too large"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn clean_close_after_handshake_is_ok() -> anyhow::Result<()> {
    let hub = Arc::new(SessionHub::new());
    let (addr, server) = spawn_server(hub).await?;

    let mut raw = TcpStream::connect(addr).await?;
    write_frame(&mut raw, &Message::Hello { version: PROTOCOL_VERSION }).await?;
    read_frame(&mut raw).await?;
    drop(raw);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tcp_transport_roundtrip() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let echo = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut t = TcpTransport::new(socket);
        let msg = t.recv().await?;
        t.send(msg).await?;
        anyhow::Ok(())
    });

    let mut client = TcpTransport::connect(addr).await?;
    let hello = Message::Hello { version: PROTOCOL_VERSION };
    client.send(hello.clone()).await?;
    assert_eq!(client.recv().await?, hello);
    echo.await??;

    client.shutdown();
    assert!(client.is_shutdown());
    assert!(client.send(hello).await.is_err());
    Ok(())
}
