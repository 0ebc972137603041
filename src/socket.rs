/*
 *  Copyright (C) 2025 Michael Bachmann
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU Affero General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU Affero General Public License for more details.
 *
 *  You should have received a copy of the GNU Affero General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! TCP client connection to the remote sensor acquisition stream.
//! Resolves `host:port`, connects to the first address returned, and
//! provides a short-read-retrying block reader ported from the upstream
//! `pass_read` routine.

use crate::error::{VibrascopeError, VibrascopeResult};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpStream, lookup_host};
use tracing::{info, instrument};

#[instrument]
pub async fn connect(host: &str, port: u16) -> VibrascopeResult<TcpStream> {
    let mut addrs = lookup_host((host, port))
        .await
        .map_err(|_| VibrascopeError::NoConnection(format!("could not resolve {host}:{port}")))?;

    let addr = addrs
        .next()
        .ok_or_else(|| VibrascopeError::NoConnection(format!("no address found for {host}:{port}")))?;

    info!("connecting to {addr}");

    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| VibrascopeError::NoConnection(format!("connect() failed for {addr}: {e}")))?;

    stream
        .set_nodelay(true)
        .map_err(|e| VibrascopeError::NoConnection(format!("set_nodelay failed: {e}")))?;

    info!("connected");
    Ok(stream)
}

/// Reads exactly `buf.len()` bytes, retrying on short reads, matching
/// `pass_read`'s `while (count != size)` loop. A read of zero bytes (peer
/// closed) or an I/O error surfaces as [`VibrascopeError::Generic`].
#[instrument(skip(stream, buf), fields(len = buf.len()))]
pub async fn read_block(stream: &mut TcpStream, buf: &mut [u8]) -> VibrascopeResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(VibrascopeError::Generic(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed mid-block",
            )));
        }
        filled += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn read_block_assembles_short_reads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(&[1, 2]).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            sock.write_all(&[3, 4, 5]).await.unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 5];
        read_block(&mut client, &mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5]);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn read_block_reports_eof_as_generic_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            drop(sock);
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 4];
        let err = read_block(&mut client, &mut buf).await.unwrap_err();
        assert!(matches!(err, VibrascopeError::Generic(_)));

        server.await.unwrap();
    }
}
