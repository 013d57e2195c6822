//! Billing cycle lifecycle engine.
//!
//! Owns the cycle state machine (active, completed, closed), enforces the
//! one-active-cycle-per-room invariant through the store's compare-and-set,
//! and recomputes member charges on every relevant mutation.

use crate::config::EngineConfig;
use crate::error::BillingError;
use crate::models::{
    BillType, BillingCycle, CycleInputs, CycleStatus, MemberCharge, PaymentStatus, Room,
};
use crate::services::allocator::{allocate, RateTable};
use crate::services::payments::all_payers_paid;
use crate::services::reconciliation;
use crate::services::store::RoomStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Warning attached to an otherwise-successful close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseWarning {
    /// The presence reset failed; ledgers may carry stale days into the
    /// next cycle. The close itself still went through.
    PresenceClearFailed,
}

/// Result of closing a cycle.
#[derive(Debug, Clone)]
pub struct CloseOutcome {
    pub cycle: BillingCycle,
    pub warnings: Vec<CloseWarning>,
}

/// Billing cycle state machine over a [`RoomStore`].
pub struct BillingEngine<S: RoomStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: RoomStore> BillingEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn load_room(&self, room_id: Uuid) -> Result<Room, BillingError> {
        self.store
            .get_room(room_id)?
            .ok_or_else(|| BillingError::NotFound(format!("room {} not found", room_id)))
    }

    fn load_cycle(&self, cycle_id: Uuid) -> Result<BillingCycle, BillingError> {
        self.store
            .get_cycle(cycle_id)?
            .ok_or_else(|| BillingError::NotFound(format!("cycle {} not found", cycle_id)))
    }

    /// Create a new active cycle for a room.
    ///
    /// Rejected with a conflict while the room already has an active cycle;
    /// after a completed or closed cycle this simply opens the next one.
    /// Charges are allocated immediately and recomputed on later mutations.
    #[instrument(skip(self, inputs), fields(room_id = %room_id))]
    pub fn create_cycle(
        &self,
        room_id: Uuid,
        inputs: CycleInputs,
    ) -> Result<BillingCycle, BillingError> {
        inputs.validate()?;

        let room = self.load_room(room_id)?;
        if let Some(current_id) = room.current_cycle_id {
            if let Some(current) = self.store.get_cycle(current_id)? {
                if current.status == CycleStatus::Active {
                    return Err(BillingError::Conflict(format!(
                        "room {} already has an active cycle {}",
                        room_id, current_id
                    )));
                }
            }
        }

        let members = self.store.get_members(room_id)?;
        let rates = RateTable::for_room(&room, &self.config);
        let allocation = allocate(
            &members,
            &rates,
            &inputs,
            Some(inputs.start_date),
            Some(inputs.end_date),
        );

        let now = Utc::now();
        let cycle = BillingCycle {
            cycle_id: Uuid::new_v4(),
            room_id,
            status: CycleStatus::Active,
            start_date: inputs.start_date,
            end_date: inputs.end_date,
            rent: inputs.rent,
            electricity: inputs.electricity,
            internet: inputs.internet,
            previous_meter_reading: inputs.previous_meter_reading,
            current_meter_reading: inputs.current_meter_reading,
            water_bill_amount: allocation.water_bill_amount,
            member_charges: allocation.charges,
            created_utc: now,
            updated_utc: now,
        };
        self.store.insert_cycle(&cycle)?;

        // The CAS is the real gate against two creates racing.
        if !self
            .store
            .set_current_cycle(room_id, room.current_cycle_id, Some(cycle.cycle_id))?
        {
            return Err(BillingError::Conflict(format!(
                "concurrent cycle creation for room {}",
                room_id
            )));
        }

        info!(cycle_id = %cycle.cycle_id, members = cycle.member_charges.len(), "Billing cycle created");
        Ok(cycle)
    }

    /// Update an active cycle's raw inputs and reallocate.
    ///
    /// Charges are replaced wholesale, never patched entry by entry.
    #[instrument(skip(self, inputs), fields(cycle_id = %cycle_id))]
    pub fn update_cycle(
        &self,
        cycle_id: Uuid,
        inputs: CycleInputs,
    ) -> Result<BillingCycle, BillingError> {
        inputs.validate()?;

        let mut cycle = self.load_cycle(cycle_id)?;
        if cycle.status != CycleStatus::Active {
            return Err(BillingError::Conflict(format!(
                "cycle {} is {}, only an active cycle can be updated",
                cycle_id,
                cycle.status.as_str()
            )));
        }

        let room = self.load_room(cycle.room_id)?;
        let members = self.store.get_members(cycle.room_id)?;
        let rates = RateTable::for_room(&room, &self.config);
        let allocation = allocate(
            &members,
            &rates,
            &inputs,
            Some(inputs.start_date),
            Some(inputs.end_date),
        );

        cycle.start_date = inputs.start_date;
        cycle.end_date = inputs.end_date;
        cycle.rent = inputs.rent;
        cycle.electricity = inputs.electricity;
        cycle.internet = inputs.internet;
        cycle.previous_meter_reading = inputs.previous_meter_reading;
        cycle.current_meter_reading = inputs.current_meter_reading;
        cycle.water_bill_amount = allocation.water_bill_amount;
        cycle.member_charges = allocation.charges;
        cycle.updated_utc = Utc::now();
        self.store.update_cycle(&cycle)?;

        info!(cycle_id = %cycle_id, "Billing cycle updated, charges reallocated");
        Ok(cycle)
    }

    /// Recompute the active cycle's charges after a presence edit.
    ///
    /// No-op when the room has no active cycle.
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub fn on_presence_changed(&self, room_id: Uuid) -> Result<(), BillingError> {
        let room = self.load_room(room_id)?;
        let Some(cycle_id) = room.current_cycle_id else {
            return Ok(());
        };
        let Some(mut cycle) = self.store.get_cycle(cycle_id)? else {
            return Ok(());
        };
        if cycle.status != CycleStatus::Active {
            return Ok(());
        }

        let members = self.store.get_members(room_id)?;
        let rates = RateTable::for_room(&room, &self.config);
        let allocation = allocate(
            &members,
            &rates,
            &cycle.inputs(),
            Some(cycle.start_date),
            Some(cycle.end_date),
        );
        cycle.water_bill_amount = allocation.water_bill_amount;
        cycle.member_charges = allocation.charges;
        cycle.updated_utc = Utc::now();
        self.store.update_cycle(&cycle)?;

        info!(cycle_id = %cycle_id, "Charges recomputed after presence change");
        Ok(())
    }

    /// Record a payment status change and re-check auto-completion.
    #[instrument(skip(self), fields(cycle_id = %cycle_id, user_id = %user_id))]
    pub fn record_payment(
        &self,
        cycle_id: Uuid,
        user_id: Uuid,
        bill_type: BillType,
        status: PaymentStatus,
    ) -> Result<(), BillingError> {
        let cycle = self.load_cycle(cycle_id)?;
        self.store
            .set_payment_status(cycle_id, user_id, bill_type, status, Utc::now())?;
        self.on_payment_status_changed(cycle.room_id)?;
        Ok(())
    }

    /// Observer hook for the external payment-verification workflow.
    ///
    /// Transitions the room's active cycle to completed once every payer has
    /// completed payment on every bill type with a non-zero amount. Returns
    /// the cycle when that transition fires.
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub fn on_payment_status_changed(
        &self,
        room_id: Uuid,
    ) -> Result<Option<BillingCycle>, BillingError> {
        let room = self.load_room(room_id)?;
        let Some(cycle_id) = room.current_cycle_id else {
            return Ok(None);
        };
        let Some(mut cycle) = self.store.get_cycle(cycle_id)? else {
            return Ok(None);
        };
        if cycle.status != CycleStatus::Active {
            return Ok(None);
        }

        let members = self.store.get_members(room_id)?;
        let records = self.store.payment_records(cycle_id)?;
        if !all_payers_paid(&cycle, &members, &records) {
            return Ok(None);
        }

        cycle.status = CycleStatus::Completed;
        cycle.updated_utc = Utc::now();
        self.store.update_cycle(&cycle)?;

        info!(cycle_id = %cycle_id, "All payers paid, cycle completed");
        Ok(Some(cycle))
    }

    /// Archive a cycle: freeze its charges, reset presence, clear raw rate
    /// inputs, and release the room's active slot.
    ///
    /// The presence reset is best-effort: a failure there surfaces as a
    /// warning on the outcome while the close itself still goes through.
    /// Everything else is all-or-nothing.
    #[instrument(skip(self), fields(cycle_id = %cycle_id))]
    pub fn close_cycle(&self, cycle_id: Uuid) -> Result<CloseOutcome, BillingError> {
        let mut cycle = self.load_cycle(cycle_id)?;
        if cycle.status == CycleStatus::Closed {
            return Err(BillingError::Conflict(format!(
                "cycle {} is already closed",
                cycle_id
            )));
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.store.clear_presence(cycle.room_id) {
            warn!(error = %e, room_id = %cycle.room_id, "Presence clear failed during close, proceeding");
            warnings.push(CloseWarning::PresenceClearFailed);
        }

        // Member charges stay as the frozen historical record; the raw
        // inputs are cleared so the next cycle starts from an unset slate.
        cycle.rent = None;
        cycle.electricity = None;
        cycle.internet = None;
        cycle.previous_meter_reading = None;
        cycle.current_meter_reading = None;
        cycle.status = CycleStatus::Closed;
        cycle.updated_utc = Utc::now();
        self.store.update_cycle(&cycle)?;

        // Release the active slot; a false CAS means the pointer had already
        // moved on, which leaves nothing to clear.
        self.store
            .set_current_cycle(cycle.room_id, Some(cycle_id), None)?;

        info!(cycle_id = %cycle_id, warnings = warnings.len(), "Billing cycle closed");
        Ok(CloseOutcome { cycle, warnings })
    }

    /// Resolve one member's charge, trusting the cache only when it already
    /// holds a payer entry for them.
    pub fn resolve_member_charge(
        &self,
        cycle_id: Uuid,
        user_id: Uuid,
    ) -> Result<MemberCharge, BillingError> {
        let cycle = self.load_cycle(cycle_id)?;
        let room = self.load_room(cycle.room_id)?;
        let members = self.store.get_members(cycle.room_id)?;
        let rates = RateTable::for_room(&room, &self.config);

        reconciliation::resolve(&cycle, &members, &rates, user_id).ok_or_else(|| {
            BillingError::NotFound(format!(
                "user {} is not a member of room {}",
                user_id, cycle.room_id
            ))
        })
    }

    /// Resolve the full charge set from live inputs, bypassing the cache.
    pub fn resolve_charges(&self, cycle_id: Uuid) -> Result<Vec<MemberCharge>, BillingError> {
        let cycle = self.load_cycle(cycle_id)?;
        let room = self.load_room(cycle.room_id)?;
        let members = self.store.get_members(cycle.room_id)?;
        let rates = RateTable::for_room(&room, &self.config);
        Ok(reconciliation::resolve_all(&cycle, &members, &rates))
    }
}
