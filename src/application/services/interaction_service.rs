use crate::application::ports::event_publisher::{InteractionEvent, InteractionEvents};
use crate::application::ports::interaction_repository::InteractionRepository;
use crate::application::ports::sync_gateway::{ReactionCommand, SyncGateway};
use crate::application::ports::view_cache::ViewCache;
use crate::domain::aggregation::{TallyDelta, recompute};
use crate::domain::entities::{Comment, InteractionRecord, InteractionValue, Post};
use crate::domain::value_objects::{
    CommentId, InteractionKind, Namespace, OptionId, PostId, ReactionType, UserId,
};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The optimistic mutation controller. Every user interaction follows the
/// same protocol: compute the target state from the *current* optimistic
/// state, write it to the durable cache and the view model synchronously,
/// then dispatch the remote call and reconcile its outcome.
///
/// Transient remote failures never roll the optimistic state back; the cache
/// record simply stays `PendingSync`. Auth (and other non-transient)
/// failures restore the pre-mutation state and surface the error. A
/// per-(kind, entity) sequence number guards async results against
/// overwriting state from a newer user action.
pub struct InteractionService {
    repository: Arc<dyn InteractionRepository>,
    gateway: Arc<dyn SyncGateway>,
    view: Arc<dyn ViewCache>,
    events: Arc<dyn InteractionEvents>,
    current_user: RwLock<Option<UserId>>,
    sequences: RwLock<HashMap<(InteractionKind, String), u64>>,
}

enum PollCall {
    Withdraw(OptionId),
    Cast(OptionId),
}

impl InteractionService {
    pub fn new(
        repository: Arc<dyn InteractionRepository>,
        gateway: Arc<dyn SyncGateway>,
        view: Arc<dyn ViewCache>,
        events: Arc<dyn InteractionEvents>,
    ) -> Self {
        Self {
            repository,
            gateway,
            view,
            events,
            current_user: RwLock::new(None),
            sequences: RwLock::new(HashMap::new()),
        }
    }

    /// Switches the active user. Subsequent reads and writes use the new
    /// user's namespace; nothing is migrated between namespaces.
    pub async fn set_current_user(&self, user: Option<UserId>) {
        let mut current = self.current_user.write().await;
        *current = user;
    }

    pub async fn namespace(&self) -> Namespace {
        let current = self.current_user.read().await;
        Namespace::for_user(current.clone())
    }

    async fn begin(&self, kind: InteractionKind, entity_id: &str) -> u64 {
        let mut sequences = self.sequences.write().await;
        let counter = sequences.entry((kind, entity_id.to_string())).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Whether `seq` is still the newest mutation for this key. Stale async
    /// results must not touch state a later action has already replaced.
    async fn still_current(&self, kind: InteractionKind, entity_id: &str, seq: u64) -> bool {
        let sequences = self.sequences.read().await;
        sequences.get(&(kind, entity_id.to_string())).copied() == Some(seq)
    }

    async fn restore_record(
        &self,
        namespace: &Namespace,
        kind: InteractionKind,
        entity_id: &str,
        previous: Option<InteractionRecord>,
    ) -> Result<(), AppError> {
        match previous {
            Some(record) => self.repository.set(namespace, kind, entity_id, &record).await,
            None => self.repository.delete(namespace, kind, entity_id).await,
        }
    }

    // ----- reactions ------------------------------------------------------

    /// Toggles the viewer's reaction on a post. Requesting the current type
    /// removes it; requesting a different type swaps; otherwise it adds.
    /// Returns the reaction the user ends up with.
    pub async fn toggle_reaction(
        &self,
        post_id: &PostId,
        requested: ReactionType,
    ) -> Result<Option<ReactionType>, AppError> {
        let namespace = self.namespace().await;
        let entity_id = post_id.as_str();
        let seq = self.begin(InteractionKind::Reaction, entity_id).await;

        let previous_record = self
            .repository
            .get(&namespace, InteractionKind::Reaction, entity_id)
            .await?;
        let original_post = self.view.get_post(post_id).await;
        let previous = match &previous_record {
            Some(record) => match &record.value {
                InteractionValue::Reaction { reaction } => Some(*reaction),
                _ => None,
            },
            None => original_post.as_ref().and_then(|post| post.user_reaction),
        };

        let command = match previous {
            Some(p) if p == requested => ReactionCommand::Remove(requested),
            Some(p) => ReactionCommand::Replace {
                from: p,
                to: requested,
            },
            None => ReactionCommand::Add(requested),
        };
        let resulting = command.resulting();

        // Apply-first: durable cache, then view model, then dispatch.
        match resulting {
            Some(reaction) => {
                self.repository
                    .set(
                        &namespace,
                        InteractionKind::Reaction,
                        entity_id,
                        &InteractionRecord::pending(InteractionValue::Reaction { reaction }),
                    )
                    .await?;
            }
            None => {
                self.repository
                    .delete(&namespace, InteractionKind::Reaction, entity_id)
                    .await?;
            }
        }

        let mut like_count = 0;
        if let Some(post) = &original_post {
            let mut post = post.clone();
            let delta = match command {
                ReactionCommand::Add(r) => TallyDelta::Add(r),
                ReactionCommand::Remove(r) => TallyDelta::Remove(r),
                ReactionCommand::Replace { from, to } => TallyDelta::Swap { from, to },
            };
            let tally = recompute(&post.reaction_tally(), delta);
            post.apply_reaction_tally(&tally);
            post.user_reaction = resulting;
            match command {
                ReactionCommand::Add(_) => post.increment_likes(),
                ReactionCommand::Remove(_) => post.decrement_likes(),
                ReactionCommand::Replace { .. } => {}
            }
            like_count = post.like_count;
            self.view.update_post(post).await;
        }

        self.events.publish(InteractionEvent::ReactionChanged {
            post_id: post_id.clone(),
            reaction: resulting,
            like_count,
        });

        match self.gateway.send_reaction(post_id, command).await {
            Ok(ack) => {
                if self
                    .still_current(InteractionKind::Reaction, entity_id, seq)
                    .await
                {
                    if resulting.is_some() {
                        self.repository
                            .mark_synced(&namespace, InteractionKind::Reaction, entity_id)
                            .await?;
                    }
                    // Server wins on counts: other users may have reacted
                    // concurrently.
                    if let Some(count) = ack.like_count
                        && let Some(mut post) = self.view.get_post(post_id).await
                    {
                        post.set_like_count(count);
                        self.view.update_post(post).await;
                    }
                }
                Ok(resulting)
            }
            Err(err) if err.is_transient() => {
                warn!("Reaction sync failed, keeping optimistic state: {err}");
                Ok(resulting)
            }
            Err(err) => {
                if self
                    .still_current(InteractionKind::Reaction, entity_id, seq)
                    .await
                {
                    self.restore_record(
                        &namespace,
                        InteractionKind::Reaction,
                        entity_id,
                        previous_record,
                    )
                    .await?;
                    let restored_count = original_post
                        .as_ref()
                        .map(|post| post.like_count)
                        .unwrap_or(0);
                    if let Some(post) = original_post {
                        self.view.update_post(post).await;
                    }
                    self.events.publish(InteractionEvent::ReactionChanged {
                        post_id: post_id.clone(),
                        reaction: previous,
                        like_count: restored_count,
                    });
                }
                Err(err)
            }
        }
    }

    // ----- bookmarks ------------------------------------------------------

    /// Toggles the bookmark flag on a post, returning the new state.
    pub async fn toggle_bookmark(&self, post_id: &PostId) -> Result<bool, AppError> {
        let namespace = self.namespace().await;
        let entity_id = post_id.as_str();
        let seq = self.begin(InteractionKind::Bookmark, entity_id).await;

        let previous_record = self
            .repository
            .get(&namespace, InteractionKind::Bookmark, entity_id)
            .await?;
        let original_post = self.view.get_post(post_id).await;
        let previous = match &previous_record {
            Some(record) => matches!(record.value, InteractionValue::Bookmark { bookmarked: true }),
            None => original_post
                .as_ref()
                .map(|post| post.is_bookmarked)
                .unwrap_or(false),
        };
        let bookmarked = !previous;

        if bookmarked {
            self.repository
                .set(
                    &namespace,
                    InteractionKind::Bookmark,
                    entity_id,
                    &InteractionRecord::pending(InteractionValue::Bookmark { bookmarked: true }),
                )
                .await?;
        } else {
            // Explicit removal deletes the record.
            self.repository
                .delete(&namespace, InteractionKind::Bookmark, entity_id)
                .await?;
        }

        if let Some(post) = &original_post {
            let mut post = post.clone();
            post.is_bookmarked = bookmarked;
            self.view.update_post(post).await;
        }

        self.events.publish(InteractionEvent::BookmarkChanged {
            post_id: post_id.clone(),
            bookmarked,
        });

        match self.gateway.toggle_bookmark(post_id).await {
            Ok(ack) => {
                if self
                    .still_current(InteractionKind::Bookmark, entity_id, seq)
                    .await
                {
                    if bookmarked {
                        self.repository
                            .mark_synced(&namespace, InteractionKind::Bookmark, entity_id)
                            .await?;
                    }
                    // Client wins on booleans; a mismatch is only logged.
                    if let Some(server) = ack.bookmarked
                        && server != bookmarked
                    {
                        debug!(
                            "Server bookmark state {} disagrees with local {} for {}",
                            server, bookmarked, post_id
                        );
                    }
                }
                Ok(bookmarked)
            }
            Err(err) if err.is_transient() => {
                warn!("Bookmark sync failed, keeping optimistic state: {err}");
                Ok(bookmarked)
            }
            Err(err) => {
                if self
                    .still_current(InteractionKind::Bookmark, entity_id, seq)
                    .await
                {
                    self.restore_record(
                        &namespace,
                        InteractionKind::Bookmark,
                        entity_id,
                        previous_record,
                    )
                    .await?;
                    if let Some(post) = original_post {
                        self.view.update_post(post).await;
                    }
                    self.events.publish(InteractionEvent::BookmarkChanged {
                        post_id: post_id.clone(),
                        bookmarked: previous,
                    });
                }
                Err(err)
            }
        }
    }

    // ----- poll votes -----------------------------------------------------

    /// Casts or withdraws a poll vote. Single-choice polls replace the
    /// previous selection (remove-old dispatched strictly before add-new);
    /// multiple-choice polls toggle membership up to `max_selections`.
    /// Returns the resulting selection set.
    pub async fn vote_poll(
        &self,
        post_id: &PostId,
        option_id: OptionId,
    ) -> Result<Vec<OptionId>, AppError> {
        let namespace = self.namespace().await;
        if namespace.is_global() {
            return Err(AppError::validation("Sign in to vote in polls"));
        }
        let entity_id = post_id.as_str();

        let original_post = self
            .view
            .get_post(post_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {post_id}")))?;
        let Some(poll) = original_post.poll.clone() else {
            return Err(AppError::validation("Post has no poll"));
        };
        if !poll.is_active {
            return Err(AppError::validation("Poll is no longer active"));
        }
        if !poll.has_option(option_id) {
            return Err(AppError::validation(format!(
                "Unknown poll option: {option_id}"
            )));
        }

        let previous_record = self
            .repository
            .get(&namespace, InteractionKind::PollVote, entity_id)
            .await?;
        let current: Vec<OptionId> = match &previous_record {
            Some(record) => match &record.value {
                InteractionValue::PollSelection { options } => options.clone(),
                _ => Vec::new(),
            },
            None => poll.user_votes.clone(),
        };

        let (selections, delta, calls) = if poll.multiple_choice {
            if current.contains(&option_id) {
                let selections: Vec<OptionId> =
                    current.iter().copied().filter(|id| *id != option_id).collect();
                (
                    selections,
                    TallyDelta::Remove(option_id),
                    vec![PollCall::Withdraw(option_id)],
                )
            } else {
                // Cap check happens before any mutation or network call.
                if let Some(cap) = poll.max_selections
                    && current.len() as u32 + 1 > cap
                {
                    return Err(AppError::validation(format!(
                        "Poll allows at most {cap} selections"
                    )));
                }
                let mut selections = current.clone();
                selections.push(option_id);
                (
                    selections,
                    TallyDelta::Add(option_id),
                    vec![PollCall::Cast(option_id)],
                )
            }
        } else {
            match current.first().copied() {
                Some(prev) if prev == option_id => (
                    Vec::new(),
                    TallyDelta::Remove(option_id),
                    vec![PollCall::Withdraw(option_id)],
                ),
                Some(prev) => (
                    vec![option_id],
                    TallyDelta::Swap {
                        from: prev,
                        to: option_id,
                    },
                    // Old strictly before new, so the user never appears to
                    // hold both votes.
                    vec![PollCall::Withdraw(prev), PollCall::Cast(option_id)],
                ),
                None => (
                    vec![option_id],
                    TallyDelta::Add(option_id),
                    vec![PollCall::Cast(option_id)],
                ),
            }
        };

        let seq = self.begin(InteractionKind::PollVote, entity_id).await;

        if selections.is_empty() {
            self.repository
                .delete(&namespace, InteractionKind::PollVote, entity_id)
                .await?;
        } else {
            self.repository
                .set(
                    &namespace,
                    InteractionKind::PollVote,
                    entity_id,
                    &InteractionRecord::pending(InteractionValue::PollSelection {
                        options: selections.clone(),
                    }),
                )
                .await?;
        }

        let mut updated_post = original_post.clone();
        let mut updated_poll = poll;
        let tally = recompute(&updated_poll.baseline_tally(), delta);
        updated_poll.apply_tally(&tally);
        updated_poll.total_votes = tally.total();
        updated_poll.user_votes = selections.clone();
        updated_post.poll = Some(updated_poll);
        self.view.update_post(updated_post).await;

        self.events.publish(InteractionEvent::PollVoteChanged {
            post_id: post_id.clone(),
            selections: selections.clone(),
        });

        let mut fully_synced = true;
        for call in calls {
            let result = match call {
                PollCall::Withdraw(id) => self.gateway.withdraw_poll_vote(post_id, id).await,
                PollCall::Cast(id) => self.gateway.cast_poll_vote(post_id, id).await,
            };
            match result {
                Ok(()) => {}
                Err(err) if err.is_transient() => {
                    // Stop here: casting after a failed withdraw would leave
                    // the server counting both options.
                    warn!("Poll vote sync failed, keeping optimistic state: {err}");
                    fully_synced = false;
                    break;
                }
                Err(err) => {
                    if self
                        .still_current(InteractionKind::PollVote, entity_id, seq)
                        .await
                    {
                        self.restore_record(
                            &namespace,
                            InteractionKind::PollVote,
                            entity_id,
                            previous_record,
                        )
                        .await?;
                        self.view.update_post(original_post).await;
                        self.events.publish(InteractionEvent::PollVoteChanged {
                            post_id: post_id.clone(),
                            selections: current,
                        });
                    }
                    return Err(err);
                }
            }
        }

        if fully_synced
            && !selections.is_empty()
            && self
                .still_current(InteractionKind::PollVote, entity_id, seq)
                .await
        {
            self.repository
                .mark_synced(&namespace, InteractionKind::PollVote, entity_id)
                .await?;
        }
        Ok(selections)
    }

    // ----- comment likes --------------------------------------------------

    /// Toggles a like on a comment. Returns (liked, like_count) as applied
    /// locally, amended with the server count once confirmed.
    pub async fn toggle_comment_like(
        &self,
        comment_id: &CommentId,
    ) -> Result<(bool, u32), AppError> {
        let namespace = self.namespace().await;
        let entity_id = comment_id.as_str();
        let seq = self.begin(InteractionKind::CommentLike, entity_id).await;

        let previous_record = self
            .repository
            .get(&namespace, InteractionKind::CommentLike, entity_id)
            .await?;
        let original_comment = self.view.get_comment(comment_id).await;
        let (was_liked, base_count) = match &previous_record {
            Some(record) => match record.value {
                InteractionValue::CommentLike { liked, count } => (liked, count),
                _ => (false, 0),
            },
            None => original_comment
                .as_ref()
                .map(|comment| (comment.is_liked, comment.like_count))
                .unwrap_or((false, 0)),
        };
        let liked = !was_liked;
        let count = if liked {
            base_count + 1
        } else {
            base_count.saturating_sub(1)
        };

        // The comment-like record is kept on unlike too: it carries the
        // last-known count, not just membership.
        self.repository
            .set(
                &namespace,
                InteractionKind::CommentLike,
                entity_id,
                &InteractionRecord::pending(InteractionValue::CommentLike { liked, count }),
            )
            .await?;

        if let Some(comment) = &original_comment {
            let mut comment = comment.clone();
            comment.is_liked = liked;
            comment.set_like_count(count);
            self.view.update_comment(comment).await;
        }

        self.events.publish(InteractionEvent::CommentLikeChanged {
            comment_id: comment_id.clone(),
            liked,
            like_count: count,
        });

        let result = if liked {
            self.gateway.like_comment(comment_id).await
        } else {
            self.gateway.unlike_comment(comment_id).await
        };

        match result {
            Ok(ack) => {
                if self
                    .still_current(InteractionKind::CommentLike, entity_id, seq)
                    .await
                {
                    let final_count = ack.like_count.unwrap_or(count);
                    self.repository
                        .set(
                            &namespace,
                            InteractionKind::CommentLike,
                            entity_id,
                            &InteractionRecord::synced(InteractionValue::CommentLike {
                                liked,
                                count: final_count,
                            }),
                        )
                        .await?;
                    if final_count != count
                        && let Some(mut comment) = self.view.get_comment(comment_id).await
                    {
                        comment.set_like_count(final_count);
                        self.view.update_comment(comment).await;
                    }
                    return Ok((liked, final_count));
                }
                Ok((liked, count))
            }
            Err(err) if err.is_transient() => {
                warn!("Comment like sync failed, keeping optimistic state: {err}");
                Ok((liked, count))
            }
            Err(err) => {
                if self
                    .still_current(InteractionKind::CommentLike, entity_id, seq)
                    .await
                {
                    self.restore_record(
                        &namespace,
                        InteractionKind::CommentLike,
                        entity_id,
                        previous_record,
                    )
                    .await?;
                    if let Some(comment) = original_comment {
                        self.view.update_comment(comment).await;
                    }
                    self.events.publish(InteractionEvent::CommentLikeChanged {
                        comment_id: comment_id.clone(),
                        liked: was_liked,
                        like_count: base_count,
                    });
                }
                Err(err)
            }
        }
    }

    // ----- hydration ------------------------------------------------------

    /// Overlays the viewer's cached interaction state onto a freshly fetched
    /// post. The cache wins over server-reported viewer state; counts stay
    /// as the server reported them.
    pub async fn hydrate_post(&self, post: &mut Post) -> Result<(), AppError> {
        let namespace = self.namespace().await;
        let entity_id = post.id.as_str();

        if let Some(record) = self
            .repository
            .get(&namespace, InteractionKind::Bookmark, entity_id)
            .await?
            && let InteractionValue::Bookmark { bookmarked } = record.value
        {
            post.is_bookmarked = bookmarked;
        }

        if let Some(record) = self
            .repository
            .get(&namespace, InteractionKind::Reaction, entity_id)
            .await?
            && let InteractionValue::Reaction { reaction } = record.value
        {
            post.user_reaction = Some(reaction);
        }

        if let Some(poll) = post.poll.as_mut()
            && let Some(record) = self
                .repository
                .get(&namespace, InteractionKind::PollVote, entity_id)
                .await?
            && let InteractionValue::PollSelection { options } = record.value
        {
            poll.user_votes = options;
        }

        Ok(())
    }

    /// Overlays cached like state onto a fetched comment and its replies.
    pub async fn hydrate_comment(&self, comment: &mut Comment) -> Result<(), AppError> {
        let namespace = self.namespace().await;

        if let Some(record) = self
            .repository
            .get(&namespace, InteractionKind::CommentLike, comment.id.as_str())
            .await?
            && let InteractionValue::CommentLike { liked, count } = record.value
        {
            comment.is_liked = liked;
            comment.set_like_count(count);
        }

        for reply in comment.replies.iter_mut() {
            if let Some(record) = self
                .repository
                .get(&namespace, InteractionKind::CommentLike, reply.id.as_str())
                .await?
                && let InteractionValue::CommentLike { liked, count } = record.value
            {
                reply.is_liked = liked;
                reply.set_like_count(count);
            }
        }

        Ok(())
    }

    /// Records still awaiting confirmation for the active user, in write
    /// order. Input for a future reconciliation pass.
    pub async fn pending_interactions(
        &self,
    ) -> Result<Vec<(InteractionKind, String, InteractionRecord)>, AppError> {
        let namespace = self.namespace().await;
        self.repository.list_pending(&namespace).await
    }

    /// Posts the active user has bookmarked, for the saved-posts screen.
    pub async fn bookmarked_post_ids(&self) -> Result<Vec<PostId>, AppError> {
        let namespace = self.namespace().await;
        let records = self
            .repository
            .list(&namespace, InteractionKind::Bookmark)
            .await?;
        let mut ids = Vec::with_capacity(records.len());
        for (entity_id, record) in records {
            if matches!(record.value, InteractionValue::Bookmark { bookmarked: true }) {
                ids.push(PostId::new(entity_id).map_err(AppError::Internal)?);
            }
        }
        Ok(ids)
    }
}
