use std::{marker::PhantomData, pin::Pin};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};
use tokio_stream::{wrappers::LinesStream, Stream, StreamExt};

pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Writes values of `T` to the backing writer, one JSON document per line.
pub struct JsonLineWriter<T, W = OwnedWriteHalf> {
    writer: W,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Serialize, W: AsyncWrite + Unpin> JsonLineWriter<T, W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            _marker: PhantomData,
        }
    }

    /// Serialize `item` and write it to the backing writer followed by a line break.
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided item may have been
    /// partially written, but future calls to `write` will start over
    /// from the beginning of the buffer. Causing undefined behaviour.
    pub async fn write(&mut self, item: &T) -> anyhow::Result<()> {
        let mut serialized_bytes = serde_json::to_vec(item)?;
        serialized_bytes.extend_from_slice(NEW_LINE);

        self.writer.write_all(serialized_bytes.as_slice()).await?;

        Ok(())
    }
}

/// Turns a reader into a stream of JSON documents, one per line.
/// A line that cannot be parsed yields an error item but does not end the stream.
pub fn json_lines<T, R>(reader: R, peer: &'static str) -> BoxedStream<anyhow::Result<T>>
where
    T: DeserializeOwned + Send + 'static,
    R: AsyncRead + Send + Unpin + 'static,
{
    Box::pin(
        LinesStream::new(BufReader::new(reader).lines()).map(move |line| {
            line.with_context(|| format!("could not read line from the {}", peer))
                .and_then(|line| {
                    serde_json::from_str::<T>(&line)
                        .with_context(|| format!("failed to deserialize line from the {}", peer))
                })
        }),
    )
}

/// Splits a tcp stream into its read half, parsed as `In`, and a writer for `Out`.
pub fn split_json_stream<In, Out>(
    stream: TcpStream,
    peer: &'static str,
) -> (BoxedStream<anyhow::Result<In>>, JsonLineWriter<Out>)
where
    In: DeserializeOwned + Send + 'static,
    Out: Serialize,
{
    let (reader, writer): (OwnedReadHalf, OwnedWriteHalf) = stream.into_split();

    (json_lines(reader, peer), JsonLineWriter::new(writer))
}
