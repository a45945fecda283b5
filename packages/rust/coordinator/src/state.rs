//! In-memory poll state, projected purely from an ordered event stream
//! (spec.md §1: "a coordinator reconstructs the state off-chain"; never
//! durably persisted, per the Non-goals).

use maci_adapters::{ChainEvent, MessagePublished};
use maci_processor::{EncryptedMessage, StateLeaf};
use maci_trees::AccQueue;

/// Errors projecting events into [`PollState`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A `ChainEvent::SignUp`'s `stateIndex` did not match its position in
    /// the event stream (sign-ups are assigned sequentially; a gap or
    /// reorder indicates a malformed or replayed event log).
    #[error("sign-up out of sequence: expected stateIndex {expected}, got {actual}")]
    SignUpOutOfSequence {
        /// The index the next sign-up was expected to have.
        expected: u64,
        /// The index actually observed.
        actual: u64,
    },
    /// A field value in an event could not be decoded.
    #[error(transparent)]
    Adapter(#[from] maci_adapters::AdapterError),
    /// The message accumulator queue rejected an enqueue (always a
    /// programming error — events are replayed once, before `merge()`).
    #[error(transparent)]
    Queue(#[from] maci_trees::AccQueueError),
}

/// The live, reconstructed state of one poll: the registered voters (as
/// [`StateLeaf`] values, index 0 reserved as the blank leaf) and the
/// messages published against it, still in publish order.
#[derive(Default)]
pub struct PollState {
    state_leaves: Vec<StateLeaf>,
    messages: Vec<EncryptedMessage>,
    message_queue: Option<AccQueue>,
}

impl PollState {
    /// An empty poll state with only the blank leaf at index 0.
    pub fn new() -> Self {
        Self {
            state_leaves: vec![StateLeaf::blank()],
            messages: Vec::new(),
            message_queue: None,
        }
    }

    /// Configure the message `AccQueue`'s depths. Must be called before
    /// [`PollState::apply`] enqueues any messages.
    pub fn with_message_queue(mut self, sub_depth: u32, main_depth: u32) -> Self {
        self.message_queue = Some(AccQueue::new(sub_depth, main_depth));
        self
    }

    /// Replay one chain event, updating the in-memory projection.
    pub fn apply(&mut self, event: ChainEvent) -> Result<(), StateError> {
        match event {
            ChainEvent::SignUp(sign_up) => {
                let expected = self.state_leaves.len() as u64;
                if sign_up.state_index != expected {
                    return Err(StateError::SignUpOutOfSequence {
                        expected,
                        actual: sign_up.state_index,
                    });
                }
                self.state_leaves.push(StateLeaf {
                    pub_key_x: sign_up.pub_key_x.to_field()?,
                    pub_key_y: sign_up.pub_key_y.to_field()?,
                    voice_credit_balance: sign_up.voice_credit_balance as i64,
                    timestamp: sign_up.timestamp,
                });
            }
            ChainEvent::MessagePublished(message) => {
                self.push_message(message)?;
            }
        }
        Ok(())
    }

    fn push_message(&mut self, message: MessagePublished) -> Result<(), StateError> {
        let enc_public_key = maci_babyjub::Point::from_xy(
            message.enc_pub_key_x.to_field()?,
            message.enc_pub_key_y.to_field()?,
        )
        .map_err(|_| {
            StateError::Adapter(maci_adapters::AdapterError::Chain(
                "ephemeral public key is off-curve".to_string(),
            ))
        })?;

        let ciphertext = message
            .enc_message
            .iter()
            .map(|f| f.to_field())
            .collect::<Result<Vec<_>, _>>()?;

        let leaf_hash = maci_poseidon_hash_message(&ciphertext, enc_public_key);
        if let Some(queue) = self.message_queue.as_mut() {
            queue.enqueue(leaf_hash)?;
        }

        self.messages.push(EncryptedMessage {
            message_index: message.message_index,
            ciphertext,
            enc_public_key,
        });
        Ok(())
    }

    /// Registered state leaves, including the blank leaf at index 0.
    pub fn state_leaves(&self) -> &[StateLeaf] {
        &self.state_leaves
    }

    /// Published messages, in publish order.
    pub fn messages(&self) -> &[EncryptedMessage] {
        &self.messages
    }

    /// Number of sign-ups tracked, including the blank leaf.
    pub fn num_sign_ups(&self) -> u64 {
        self.state_leaves.len() as u64
    }

    /// Seal the message queue and return its main root. Fails if no queue
    /// was configured via [`PollState::with_message_queue`].
    pub fn merge_message_queue(&mut self) -> Result<maci_field::Fp, StateError> {
        let queue = self
            .message_queue
            .as_mut()
            .expect("with_message_queue must be called before merging");
        Ok(queue.merge()?)
    }
}

/// A leaf value for the message AccQueue: a single field element
/// committing to one message's full ciphertext and ephemeral key, so the
/// queue can batch messages the same way it batches any other leaf type.
///
/// The ephemeral key's two coordinates plus the ciphertext's ten elements
/// (twelve field elements total) do not fit a single `Poseidon_5` call, so
/// they are folded in 4-wide chunks through a running accumulator —
/// `acc = Poseidon_5(acc, chunk...)`, zero-padding the final chunk — the
/// same chained-hash idiom this workspace already uses for its zero-cache
/// recurrence. Every input byte is load-bearing: two messages differing in
/// any ciphertext element must not collide on this leaf hash.
fn maci_poseidon_hash_message(ciphertext: &[maci_field::Fp], enc_public_key: maci_babyjub::Point) -> maci_field::Fp {
    let mut elements = Vec::with_capacity(2 + ciphertext.len());
    elements.push(enc_public_key.x());
    elements.push(enc_public_key.y());
    elements.extend_from_slice(ciphertext);

    let mut acc = maci_field::Fp::zero();
    for chunk in elements.chunks(4) {
        let mut padded = [maci_field::Fp::zero(); 4];
        padded[..chunk.len()].copy_from_slice(chunk);
        acc = maci_poseidon::hash5(acc, padded[0], padded[1], padded[2], padded[3]);
    }
    acc
}
