//! Subscription reconciliation for the fleet agent
//!
//! This module contains the `SubscriptionReconciler`, the only owner of the
//! agent's subscribed channel set. Every operation holds the set's lock for
//! its whole read-modify-write sequence, transport calls included, so
//! concurrent deliveries are applied one after another.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use fleet_core::{ChannelId, ChannelRef, ChannelTransport, SubscriptionConfig};

// ----------------------------------------------------------------------------
// Membership Report
// ----------------------------------------------------------------------------

/// What a membership update did at the transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipReport {
    pub full_list: bool,
    /// Channels left before a full-list replace
    pub unsubscribed: Vec<ChannelId>,
    /// Channels that joined the subscription set
    pub subscribed: Vec<ChannelId>,
    /// Channels the transport refused; absent until the next full list
    pub failed: Vec<ChannelId>,
}

// ----------------------------------------------------------------------------
// Subscription Reconciler
// ----------------------------------------------------------------------------

/// Owns the ordered set of channels the agent is subscribed to
pub struct SubscriptionReconciler {
    transport: Arc<dyn ChannelTransport>,
    channels: Mutex<Vec<ChannelId>>,
    config: SubscriptionConfig,
}

impl SubscriptionReconciler {
    /// Create a reconciler with an empty subscription set
    pub fn new(transport: Arc<dyn ChannelTransport>, config: SubscriptionConfig) -> Self {
        Self {
            transport,
            channels: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Apply a group membership update
    ///
    /// A full list unsubscribes every current channel and replaces the set
    /// with the groups that subscribe successfully. Otherwise the successful
    /// groups are appended to the current set.
    pub async fn apply_group_membership(
        &self,
        full_list: bool,
        groups: &[ChannelRef],
    ) -> MembershipReport {
        let mut channels = self.channels.lock().await;
        let mut report = MembershipReport {
            full_list,
            ..MembershipReport::default()
        };

        if full_list {
            // The set keeps its old entries until the replacement is ready.
            // Duplicates share one transport subscription, so each id leaves once.
            let previous = channels.clone();
            for channel_id in previous {
                if report.unsubscribed.contains(&channel_id) {
                    continue;
                }
                self.leave(&channel_id).await;
                report.unsubscribed.push(channel_id);
            }
        }

        for group in groups {
            match self.transport.subscribe(group).await {
                Ok(channel_id) => report.subscribed.push(channel_id),
                Err(e) => {
                    warn!(
                        channel_id = %group.channel_id,
                        error = %e,
                        "failed to subscribe to group channel"
                    );
                    report.failed.push(group.channel_id.clone());
                }
            }
        }

        if full_list {
            *channels = report.subscribed.clone();
        } else {
            channels.extend(report.subscribed.iter().cloned());
        }

        info!(
            full_list,
            subscribed = report.subscribed.len(),
            failed = report.failed.len(),
            total = channels.len(),
            "applied group membership"
        );
        self.trace(&channels);
        report
    }

    /// Unsubscribe a channel and drop it from the set
    ///
    /// Returns how many entries were removed. Every entry equal to
    /// `channel_id` goes, since one transport unsubscribe ends all of them.
    /// A channel that is not in the set is a no-op.
    pub async fn remove_channel(&self, channel_id: &ChannelId) -> usize {
        let mut channels = self.channels.lock().await;

        self.leave(channel_id).await;

        let before = channels.len();
        channels.retain(|existing| existing != channel_id);
        let removed = before - channels.len();

        if removed == 0 {
            debug!(%channel_id, "channel was not in the subscription set");
        } else {
            info!(%channel_id, removed, total = channels.len(), "removed channel");
        }
        self.trace(&channels);
        removed
    }

    /// Copy of the current subscription set, in subscription order
    pub async fn snapshot(&self) -> Vec<ChannelId> {
        self.channels.lock().await.clone()
    }

    async fn leave(&self, channel_id: &ChannelId) {
        match self.transport.unsubscribe(channel_id).await {
            Ok(()) => debug!(%channel_id, "unsubscribed from group channel"),
            Err(e) => warn!(%channel_id, error = %e, "failed to unsubscribe from group channel"),
        }
    }

    fn trace(&self, channels: &[ChannelId]) {
        if self.config.trace_changes {
            debug!(channels = ?channels, "subscription set");
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
