//! Timeline merger
//!
//! Folds a conversation's messages and quotes into one ascending feed. The
//! sort key is (created_at, id); ids are time-ordered snowflakes, so equal
//! timestamps resolve by insertion order and the merge is stable across
//! recomputation. The viewer's clear watermark filters messages only -
//! quotes are money records and stay visible.

use chrono::{DateTime, Utc};
use tracing::instrument;

use oficio_core::entities::{Message, Quote};
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// One entry of the merged feed
#[derive(Debug, Clone)]
pub enum TimelineEntry {
    Message(Message),
    Quote(Quote),
}

impl TimelineEntry {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Message(m) => m.created_at,
            Self::Quote(q) => q.created_at,
        }
    }

    pub fn id(&self) -> Snowflake {
        match self {
            Self::Message(m) => m.id,
            Self::Quote(q) => q.id,
        }
    }
}

/// Entry plus its date-divider flag
#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub entry: TimelineEntry,
    /// True when this entry is the first of its calendar day, i.e. a date
    /// divider belongs right above it
    pub starts_new_day: bool,
}

/// Pure merge over already-loaded sets. Messages at or before the watermark
/// are dropped; quotes always stay.
pub fn merge_timeline(
    messages: Vec<Message>,
    quotes: Vec<Quote>,
    watermark: Option<DateTime<Utc>>,
) -> Vec<TimelineItem> {
    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(messages.len() + quotes.len());

    entries.extend(
        messages
            .into_iter()
            .filter(|m| watermark.is_none_or(|w| m.created_at > w))
            .map(TimelineEntry::Message),
    );
    entries.extend(quotes.into_iter().map(TimelineEntry::Quote));

    entries.sort_by_key(|e| (e.created_at(), e.id()));

    let mut items = Vec::with_capacity(entries.len());
    let mut previous_day = None;
    for entry in entries {
        let day = entry.created_at().date_naive();
        let starts_new_day = previous_day != Some(day);
        previous_day = Some(day);
        items.push(TimelineItem {
            entry,
            starts_new_day,
        });
    }

    items
}

/// Timeline service
pub struct TimelineService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TimelineService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The viewer's merged feed for a conversation
    #[instrument(skip(self))]
    pub async fn timeline(
        &self,
        conversation_id: Snowflake,
        viewer_id: Snowflake,
    ) -> ServiceResult<Vec<TimelineItem>> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;
        if !conversation.is_participant(viewer_id) {
            return Err(DomainError::NotParticipant.into());
        }

        let messages = self.ctx.message_repo().find_all(conversation_id).await?;
        let quotes = self.ctx.quote_repo().find_by_conversation(conversation_id).await?;
        let watermark = self
            .ctx
            .conversation_repo()
            .watermark(conversation_id, viewer_id)
            .await?;

        Ok(merge_timeline(messages, quotes, watermark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use oficio_core::entities::MessageKind;
    use oficio_core::value_objects::Price;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn message(id: i64, created_at: DateTime<Utc>) -> Message {
        Message {
            id: Snowflake::new(id),
            conversation_id: Snowflake::new(1),
            sender_id: Snowflake::new(10),
            content: format!("m{id}"),
            kind: MessageKind::Text,
            file_url: None,
            file_name: None,
            reply_to_id: None,
            created_at,
            read_at: None,
        }
    }

    fn quote(id: i64, created_at: DateTime<Utc>) -> Quote {
        let mut q = Quote::new(
            Snowflake::new(id),
            Snowflake::new(1),
            Snowflake::new(20),
            Snowflake::new(10),
            format!("q{id}"),
            Price::from_centavos(1_000).unwrap(),
        );
        q.created_at = created_at;
        q
    }

    #[test]
    fn interleaves_by_timestamp() {
        let items = merge_timeline(
            vec![message(1, at(0)), message(4, at(30))],
            vec![quote(2, at(10)), quote(5, at(40))],
            None,
        );

        let ids: Vec<i64> = items.iter().map(|i| i.entry.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order_across_merges() {
        let t = at(100);
        let a = message(7, t);
        let b = message(8, t);

        for _ in 0..10 {
            let items = merge_timeline(vec![b.clone(), a.clone()], vec![], None);
            let ids: Vec<i64> = items.iter().map(|i| i.entry.id().get()).collect();
            assert_eq!(ids, vec![7, 8], "A was inserted before B and must stay first");
        }
    }

    #[test]
    fn watermark_hides_messages_but_not_quotes() {
        let items = merge_timeline(
            vec![message(1, at(0)), message(3, at(100))],
            vec![quote(2, at(50))],
            Some(at(50)),
        );

        let ids: Vec<i64> = items.iter().map(|i| i.entry.id().get()).collect();
        assert_eq!(ids, vec![2, 3], "old message hidden, quote kept");
    }

    #[test]
    fn date_dividers_on_day_boundaries() {
        let day_one = Utc.with_ymd_and_hms(2025, 3, 14, 22, 0, 0).unwrap();
        let later_that_day = day_one + Duration::hours(1);
        let next_day = day_one + Duration::hours(5);

        let items = merge_timeline(
            vec![
                message(1, day_one),
                message(2, later_that_day),
                message(3, next_day),
            ],
            vec![],
            None,
        );

        let flags: Vec<bool> = items.iter().map(|i| i.starts_new_day).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn service_merges_and_respects_the_viewers_watermark() {
        use crate::services::{ConversationService, MessageService, QuoteService};
        use crate::testing::TestHarness;

        let harness = TestHarness::new();
        let conversation = harness.conversation().await;

        MessageService::new(harness.ctx())
            .send_message(conversation.id, harness.client, "antes".into(), None)
            .await
            .unwrap();
        QuoteService::new(harness.ctx())
            .create_quote(
                conversation.id,
                harness.professional,
                "Pintura".into(),
                Price::from_centavos(25_000).unwrap(),
            )
            .await
            .unwrap();

        ConversationService::new(harness.ctx())
            .clear_conversation(conversation.id, harness.client)
            .await
            .unwrap();

        MessageService::new(harness.ctx())
            .send_message(conversation.id, harness.professional, "depois".into(), None)
            .await
            .unwrap();

        let service = TimelineService::new(harness.ctx());

        let client_view = service
            .timeline(conversation.id, harness.client)
            .await
            .unwrap();
        let kinds: Vec<&str> = client_view
            .iter()
            .map(|i| match &i.entry {
                TimelineEntry::Message(_) => "message",
                TimelineEntry::Quote(_) => "quote",
            })
            .collect();
        assert_eq!(kinds, vec!["quote", "message"], "pre-clear message hidden, quote kept");

        let professional_view = service
            .timeline(conversation.id, harness.professional)
            .await
            .unwrap();
        assert_eq!(professional_view.len(), 3, "other side sees everything");
    }
}
