#![no_std]

//! # Mentora Lobby
//!
//! Escrow contract coordinating multi-party fund custody for group
//! mentorship sessions. A creator opens a lobby naming a master (mentor),
//! participants deposit a fixed amount each, and the master either accepts
//! and later completes the session (payout, minus the platform fee) or
//! cancels it (everyone refunded).
//!
//! ## Lifecycle
//! ```text
//! Created ──accept──▶ Accepted ──complete──▶ Completed
//!    │                    │
//!    └──────cancel────────┴──cancel──▶ Cancelled
//! ```
//! `Completed` and `Cancelled` are terminal. Participants may join and
//! abandon (full refund) only while the lobby is `Created`; acceptance
//! freezes the roster until settlement. There is no implicit expiry — a
//! lobby stays open until a role-authorized party transitions it.
//!
//! ## Funds
//! All value moves through a single token contract (a Stellar Asset
//! Contract, native XLM included) fixed at deployment. Deposits are pulled
//! from the participant in the same invocation that records them; refunds
//! and payouts are direct transfers from the contract balance. On every
//! path the contract balance equals the sum of undistributed deposits
//! across open lobbies plus not-yet-withdrawn platform fees.
//!
//! ## Roles
//! - **creator**: opened the lobby; no special powers after creation.
//! - **master**: accepts, cancels, completes; receives the payout.
//! - **participant**: holds a live deposit in a `Created` lobby.
//! - **owner**: platform admin; pause, blacklist, fee withdrawal, upgrade.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype,
    panic_with_error, token, Address, BytesN, Env, Map, String, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvLobbyCreated {
    pub lobby_id: u32,
    pub creator: Address,
    pub master: Address,
    pub amount_per_participant: i128,
    pub max_participants: u32,
}

#[contractevent]
pub struct EvParticipantJoined {
    pub lobby_id: u32,
    pub participant: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvParticipantAbandoned {
    pub lobby_id: u32,
    pub participant: Address,
    pub refunded: i128,
}

#[contractevent]
pub struct EvLobbyAccepted {
    pub lobby_id: u32,
    pub master: Address,
    pub participants: u32,
}

/// Emitted once per refunded participant during a cancellation.
#[contractevent]
pub struct EvRefundIssued {
    pub lobby_id: u32,
    pub participant: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvLobbyCancelled {
    pub lobby_id: u32,
    pub master: Address,
    pub refunded_total: i128,
}

#[contractevent]
pub struct EvLobbyCompleted {
    pub lobby_id: u32,
    pub master: Address,
    pub payout: i128,
    pub fee: i128,
}

#[contractevent]
pub struct EvFeesWithdrawn {
    pub owner: Address,
    pub to: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvPausedSet {
    pub paused: bool,
}

#[contractevent]
pub struct EvBlacklistSet {
    pub address: Address,
    pub blacklisted: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

/// Mentor registry collaborator. When configured, `complete_lobby` reports
/// the settled session so the registry can accumulate per-mentor stats.
/// The registry authorizes this contract's address as the caller.
#[contractclient(name = "MentorRegistryClient")]
pub trait MentorRegistry {
    fn record_session(
        env: Env,
        caller: Address,
        mentor: Address,
        lobby_id: u32,
        participants: u32,
        amount_paid: i128,
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LobbyError {
    NotFound = 1,
    InvalidArgument = 2,
    InvalidState = 3,
    Unauthorized = 4,
    Full = 5,
    AlreadyJoined = 6,
    NotAParticipant = 7,
    InvalidPayment = 8,
    NoFunds = 9,
    Paused = 10,
    Blacklisted = 11,
    NothingToWithdraw = 12,
    OwnerNotSet = 13,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Lifecycle states (compact u32 encoding for storage efficiency)
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) type LobbyState = u32;

pub const STATE_CREATED: LobbyState = 1;
pub const STATE_ACCEPTED: LobbyState = 2;
pub const STATE_CANCELLED: LobbyState = 3;
pub const STATE_COMPLETED: LobbyState = 4;

// ═══════════════════════════════════════════════════════════════════════════════
//  Lobby record & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lobby {
    pub id: u32,
    pub creator: Address,
    pub master: Address,
    pub description: String,
    pub amount_per_participant: i128,
    pub max_participants: u32,
    pub current_participants: u32,
    pub total_deposited: i128,
    pub state: u32,
    /// Insertion-ordered roster. Retained through terminal transitions as
    /// the historical participant list (removal only via `abandon`).
    pub participants: Vec<Address>,
    /// Live escrow per participant. Key absent means no deposit held.
    /// Emptied on `cancel`/`complete`; the roster above is not.
    pub deposits: Map<Address, i128>,
    /// participant → position in `participants`. Kept consistent with the
    /// roster after every mutation; makes abandon removal O(1).
    pub participant_index: Map<Address, u32>,
    pub created_ledger: u32,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Owner,
    Token,
    FeeBps,
    /// Optional mentor registry address; unset means no reporting.
    Registry,
    Paused,
    AccruedFees,
    NextLobbyId,
    Lobby(u32),
    ByCreator(Address),
    ByMaster(Address),
    /// Append-on-join index. Never pruned on abandon — membership truth
    /// lives in the lobby record, not here.
    ByParticipant(Address),
    Blacklist(Address),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Platform fee ceiling: 10%.
pub const MAX_FEE_BPS: u32 = 1_000;
const BPS_DENOMINATOR: i128 = 10_000;

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Lobby records are kept for audit; TTL is extended on every write (120 days)
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60; // 10,368,000 seconds
const LOBBY_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS; // 2,073,600 ledgers

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct LobbyContract;

#[contractimpl]
impl LobbyContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    /// * `owner` - platform admin (pause/blacklist/fee withdrawal/upgrade)
    /// * `token` - the Stellar Asset Contract all value moves through
    /// * `fee_bps` - platform fee in basis points, skimmed from payouts
    pub fn __constructor(env: Env, owner: Address, token: Address, fee_bps: u32) {
        if fee_bps > MAX_FEE_BPS {
            panic_with_error!(&env, LobbyError::InvalidArgument);
        }
        env.storage().instance().set(&StorageKey::Owner, &owner);
        env.storage().instance().set(&StorageKey::Token, &token);
        env.storage().instance().set(&StorageKey::FeeBps, &fee_bps);
        env.storage().instance().set(&StorageKey::Paused, &false);
        env.storage().instance().set(&StorageKey::AccruedFees, &0i128);
        env.storage().instance().set(&StorageKey::NextLobbyId, &1u32);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Escrow lifecycle
    // ───────────────────────────────────────────────────────────────────────────

    /// Open a new lobby in the `Created` state and return its id.
    ///
    /// Ids start at 1, strictly increase, and are never reused — terminal
    /// lobbies keep theirs forever.
    pub fn create_lobby(
        env: Env,
        creator: Address,
        master: Address,
        max_participants: u32,
        amount_per_participant: i128,
        description: String,
    ) -> Result<u32, LobbyError> {
        creator.require_auth();
        Self::ensure_not_paused(&env)?;
        Self::ensure_not_blacklisted(&env, &creator)?;

        if max_participants == 0 || amount_per_participant <= 0 || description.len() == 0 {
            return Err(LobbyError::InvalidArgument);
        }

        let lobby_id: u32 = env
            .storage()
            .instance()
            .get(&StorageKey::NextLobbyId)
            .unwrap_or(1);
        env.storage()
            .instance()
            .set(&StorageKey::NextLobbyId, &(lobby_id + 1));

        let lobby = Lobby {
            id: lobby_id,
            creator: creator.clone(),
            master: master.clone(),
            description,
            amount_per_participant,
            max_participants,
            current_participants: 0,
            total_deposited: 0,
            state: STATE_CREATED,
            participants: Vec::new(&env),
            deposits: Map::new(&env),
            participant_index: Map::new(&env),
            created_ledger: env.ledger().sequence(),
        };
        Self::write_lobby(&env, lobby_id, &lobby);

        Self::append_index(&env, StorageKey::ByCreator(creator.clone()), lobby_id);
        Self::append_index(&env, StorageKey::ByMaster(master.clone()), lobby_id);

        EvLobbyCreated {
            lobby_id,
            creator,
            master,
            amount_per_participant,
            max_participants,
        }
        .publish(&env);

        Ok(lobby_id)
    }

    /// Join a `Created` lobby by depositing exactly `amount_per_participant`.
    ///
    /// The deposit is pulled from the participant in this same invocation,
    /// so the ledger update and the transfer succeed or fail as one unit.
    /// Both overpayment and underpayment are rejected outright.
    pub fn join_lobby(
        env: Env,
        lobby_id: u32,
        participant: Address,
        payment: i128,
    ) -> Result<(), LobbyError> {
        participant.require_auth();

        let mut lobby = Self::read_lobby(&env, lobby_id)?;
        Self::ensure_not_paused(&env)?;
        Self::ensure_not_blacklisted(&env, &participant)?;

        if lobby.state != STATE_CREATED {
            return Err(LobbyError::InvalidState);
        }
        if lobby.current_participants >= lobby.max_participants {
            return Err(LobbyError::Full);
        }
        if lobby.deposits.contains_key(participant.clone()) {
            return Err(LobbyError::AlreadyJoined);
        }
        if payment != lobby.amount_per_participant {
            return Err(LobbyError::InvalidPayment);
        }

        let tok = Self::token_client(&env);
        tok.transfer(&participant, &env.current_contract_address(), &payment);

        let position = lobby.participants.len();
        lobby.participants.push_back(participant.clone());
        lobby.participant_index.set(participant.clone(), position);
        lobby.deposits.set(participant.clone(), payment);
        lobby.current_participants += 1;
        lobby.total_deposited += payment;
        Self::write_lobby(&env, lobby_id, &lobby);

        // Role index is append-once even across abandon/rejoin cycles.
        let key = StorageKey::ByParticipant(participant.clone());
        let ids: Vec<u32> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(&env));
        if !ids.contains(&lobby_id) {
            Self::append_index(&env, key, lobby_id);
        }

        EvParticipantJoined {
            lobby_id,
            participant,
            amount: payment,
        }
        .publish(&env);

        Ok(())
    }

    /// Withdraw from a still-`Created` lobby with a full refund.
    ///
    /// Illegal once the master has accepted (or in any later state, the
    /// lobby having been cancelled included). The vacated roster slot is
    /// filled by the tail participant; everyone else keeps their position.
    /// The caller may rejoin later with fresh accounting.
    pub fn abandon_lobby(
        env: Env,
        lobby_id: u32,
        participant: Address,
    ) -> Result<(), LobbyError> {
        participant.require_auth();

        let mut lobby = Self::read_lobby(&env, lobby_id)?;
        if lobby.state != STATE_CREATED {
            return Err(LobbyError::InvalidState);
        }
        let deposit = lobby
            .deposits
            .get(participant.clone())
            .ok_or(LobbyError::NotAParticipant)?;

        let tok = Self::token_client(&env);
        tok.transfer(&env.current_contract_address(), &participant, &deposit);

        Self::remove_participant(&mut lobby, &participant);
        lobby.deposits.remove(participant.clone());
        lobby.current_participants -= 1;
        lobby.total_deposited -= deposit;
        Self::write_lobby(&env, lobby_id, &lobby);

        EvParticipantAbandoned {
            lobby_id,
            participant,
            refunded: deposit,
        }
        .publish(&env);

        Ok(())
    }

    /// Master commits to the lobby as-is. Freezes the roster and deposits
    /// until `cancel` or `complete`. No funds move. A lobby with zero
    /// participants may be accepted (it can then only be cancelled).
    pub fn accept_lobby(env: Env, lobby_id: u32, caller: Address) -> Result<(), LobbyError> {
        caller.require_auth();

        let mut lobby = Self::read_lobby(&env, lobby_id)?;
        if caller != lobby.master {
            return Err(LobbyError::Unauthorized);
        }
        if lobby.state != STATE_CREATED {
            return Err(LobbyError::InvalidState);
        }

        lobby.state = STATE_ACCEPTED;
        Self::write_lobby(&env, lobby_id, &lobby);

        EvLobbyAccepted {
            lobby_id,
            master: lobby.master,
            participants: lobby.current_participants,
        }
        .publish(&env);

        Ok(())
    }

    /// Master aborts the lobby, refunding every live deposit in full.
    /// Legal from both `Created` and `Accepted`. The roster is retained
    /// unmodified as the historical record; only the deposits are zeroed.
    pub fn cancel_lobby(env: Env, lobby_id: u32, caller: Address) -> Result<(), LobbyError> {
        caller.require_auth();

        let mut lobby = Self::read_lobby(&env, lobby_id)?;
        if caller != lobby.master {
            return Err(LobbyError::Unauthorized);
        }
        if lobby.state != STATE_CREATED && lobby.state != STATE_ACCEPTED {
            return Err(LobbyError::InvalidState);
        }

        let tok = Self::token_client(&env);
        let me = env.current_contract_address();
        let mut refunded_total: i128 = 0;
        for participant in lobby.participants.iter() {
            if let Some(amount) = lobby.deposits.get(participant.clone()) {
                tok.transfer(&me, &participant, &amount);
                refunded_total += amount;
                EvRefundIssued {
                    lobby_id,
                    participant,
                    amount,
                }
                .publish(&env);
            }
        }

        lobby.deposits = Map::new(&env);
        lobby.total_deposited = 0;
        lobby.state = STATE_CANCELLED;
        Self::write_lobby(&env, lobby_id, &lobby);

        EvLobbyCancelled {
            lobby_id,
            master: lobby.master,
            refunded_total,
        }
        .publish(&env);

        Ok(())
    }

    /// Master claims the payout after running the session. The platform
    /// fee is skimmed into the accrued-fee pot; the remainder goes to the
    /// master. An accepted lobby nobody joined cannot be completed — it
    /// holds nothing to pay out — only cancelled.
    pub fn complete_lobby(env: Env, lobby_id: u32, caller: Address) -> Result<(), LobbyError> {
        caller.require_auth();

        let mut lobby = Self::read_lobby(&env, lobby_id)?;
        if caller != lobby.master {
            return Err(LobbyError::Unauthorized);
        }
        if lobby.state != STATE_ACCEPTED {
            return Err(LobbyError::InvalidState);
        }
        if lobby.total_deposited <= 0 {
            return Err(LobbyError::NoFunds);
        }

        let total = lobby.total_deposited;
        let fee_bps: u32 = env
            .storage()
            .instance()
            .get(&StorageKey::FeeBps)
            .unwrap_or(0);
        let fee = total * (fee_bps as i128) / BPS_DENOMINATOR;
        let payout = total - fee;

        if fee > 0 {
            let accrued: i128 = env
                .storage()
                .instance()
                .get(&StorageKey::AccruedFees)
                .unwrap_or(0);
            env.storage()
                .instance()
                .set(&StorageKey::AccruedFees, &(accrued + fee));
        }

        let tok = Self::token_client(&env);
        tok.transfer(&env.current_contract_address(), &lobby.master, &payout);

        lobby.deposits = Map::new(&env);
        lobby.total_deposited = 0;
        lobby.state = STATE_COMPLETED;
        Self::write_lobby(&env, lobby_id, &lobby);

        EvLobbyCompleted {
            lobby_id,
            master: lobby.master.clone(),
            payout,
            fee,
        }
        .publish(&env);

        // Report the settled session to the mentor registry when one is
        // wired in. Part of the same atomic unit: a failing registry call
        // unwinds the completion.
        if let Some(registry_addr) = env
            .storage()
            .instance()
            .get::<StorageKey, Address>(&StorageKey::Registry)
        {
            let registry = MentorRegistryClient::new(&env, &registry_addr);
            registry.record_session(
                &env.current_contract_address(),
                &lobby.master,
                &lobby_id,
                &lobby.current_participants,
                &payout,
            );
        }

        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read accessors
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_lobby(env: Env, lobby_id: u32) -> Result<Lobby, LobbyError> {
        Self::read_lobby(&env, lobby_id)
    }

    pub fn get_participants(env: Env, lobby_id: u32) -> Result<Vec<Address>, LobbyError> {
        Ok(Self::read_lobby(&env, lobby_id)?.participants)
    }

    /// Live deposit held for `participant` in this lobby. Zero means "not
    /// currently a participant" (never joined, abandoned, or settled).
    pub fn get_deposit(
        env: Env,
        lobby_id: u32,
        participant: Address,
    ) -> Result<i128, LobbyError> {
        let lobby = Self::read_lobby(&env, lobby_id)?;
        Ok(lobby.deposits.get(participant).unwrap_or(0))
    }

    /// Count of lobbies ever created (terminal ones included).
    pub fn get_total_lobbies(env: Env) -> u32 {
        let next: u32 = env
            .storage()
            .instance()
            .get(&StorageKey::NextLobbyId)
            .unwrap_or(1);
        next - 1
    }

    pub fn get_lobbies_by_creator(env: Env, creator: Address) -> Vec<u32> {
        Self::read_index(&env, StorageKey::ByCreator(creator))
    }

    pub fn get_lobbies_by_master(env: Env, master: Address) -> Vec<u32> {
        Self::read_index(&env, StorageKey::ByMaster(master))
    }

    /// Every lobby the address ever joined. Append-only — entries survive
    /// abandonment; check the lobby record for live membership.
    pub fn get_lobbies_by_participant(env: Env, participant: Address) -> Vec<u32> {
        Self::read_index(&env, StorageKey::ByParticipant(participant))
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Owner administration
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Result<Address, LobbyError> {
        Self::load_owner(&env)
    }

    pub fn set_owner(env: Env, caller: Address, new_owner: Address) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        env.storage().instance().set(&StorageKey::Owner, &new_owner);
        Ok(())
    }

    pub fn get_token(env: Env) -> Result<Address, LobbyError> {
        env.storage()
            .instance()
            .get(&StorageKey::Token)
            .ok_or(LobbyError::OwnerNotSet)
    }

    pub fn get_fee_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&StorageKey::FeeBps)
            .unwrap_or(0)
    }

    /// Change the platform fee for future completions. Capped at 10%.
    pub fn set_fee_bps(env: Env, caller: Address, fee_bps: u32) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        if fee_bps > MAX_FEE_BPS {
            return Err(LobbyError::InvalidArgument);
        }
        env.storage().instance().set(&StorageKey::FeeBps, &fee_bps);
        Ok(())
    }

    pub fn get_registry(env: Env) -> Option<Address> {
        env.storage().instance().get(&StorageKey::Registry)
    }

    pub fn set_registry(env: Env, caller: Address, registry: Address) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        env.storage().instance().set(&StorageKey::Registry, &registry);
        Ok(())
    }

    /// Halt lobby creation and joining. Abandon, cancel and complete stay
    /// available — a pause must never trap escrowed funds.
    pub fn pause(env: Env, caller: Address) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        env.storage().instance().set(&StorageKey::Paused, &true);
        EvPausedSet { paused: true }.publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        env.storage().instance().set(&StorageKey::Paused, &false);
        EvPausedSet { paused: false }.publish(&env);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage()
            .instance()
            .get(&StorageKey::Paused)
            .unwrap_or(false)
    }

    /// Bar (or readmit) an address from creating and joining lobbies.
    /// Existing deposits of a newly blacklisted address remain refundable.
    pub fn set_blacklisted(
        env: Env,
        caller: Address,
        address: Address,
        blacklisted: bool,
    ) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        let key = StorageKey::Blacklist(address.clone());
        if blacklisted {
            env.storage().persistent().set(&key, &true);
            env.storage()
                .persistent()
                .extend_ttl(&key, LOBBY_TTL_LEDGERS, LOBBY_TTL_LEDGERS);
        } else if env.storage().persistent().has(&key) {
            env.storage().persistent().remove(&key);
        }
        EvBlacklistSet {
            address,
            blacklisted,
        }
        .publish(&env);
        Ok(())
    }

    pub fn is_blacklisted(env: Env, address: Address) -> bool {
        env.storage()
            .persistent()
            .get(&StorageKey::Blacklist(address))
            .unwrap_or(false)
    }

    pub fn accrued_fees(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&StorageKey::AccruedFees)
            .unwrap_or(0)
    }

    /// Transfer all accrued platform fees to `to` and zero the pot.
    pub fn withdraw_fees(env: Env, caller: Address, to: Address) -> Result<i128, LobbyError> {
        Self::require_owner(&env, &caller)?;

        let amount: i128 = env
            .storage()
            .instance()
            .get(&StorageKey::AccruedFees)
            .unwrap_or(0);
        if amount == 0 {
            return Err(LobbyError::NothingToWithdraw);
        }

        let tok = Self::token_client(&env);
        tok.transfer(&env.current_contract_address(), &to, &amount);
        env.storage().instance().set(&StorageKey::AccruedFees, &0i128);

        EvFeesWithdrawn {
            owner: caller,
            to,
            amount,
        }
        .publish(&env);

        Ok(amount)
    }

    pub fn upgrade(env: Env, caller: Address, new_wasm_hash: BytesN<32>) -> Result<(), LobbyError> {
        Self::require_owner(&env, &caller)?;
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Internal: storage helpers
    // ───────────────────────────────────────────────────────────────────────────

    fn read_lobby(env: &Env, lobby_id: u32) -> Result<Lobby, LobbyError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Lobby(lobby_id))
            .ok_or(LobbyError::NotFound)
    }

    fn write_lobby(env: &Env, lobby_id: u32, lobby: &Lobby) {
        let key = StorageKey::Lobby(lobby_id);
        env.storage().persistent().set(&key, lobby);
        env.storage()
            .persistent()
            .extend_ttl(&key, LOBBY_TTL_LEDGERS, LOBBY_TTL_LEDGERS);
    }

    fn read_index(env: &Env, key: StorageKey) -> Vec<u32> {
        env.storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn append_index(env: &Env, key: StorageKey, lobby_id: u32) {
        let mut ids: Vec<u32> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(env));
        ids.push_back(lobby_id);
        env.storage().persistent().set(&key, &ids);
        env.storage()
            .persistent()
            .extend_ttl(&key, LOBBY_TTL_LEDGERS, LOBBY_TTL_LEDGERS);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Internal: guards
    // ───────────────────────────────────────────────────────────────────────────

    fn load_owner(env: &Env) -> Result<Address, LobbyError> {
        env.storage()
            .instance()
            .get(&StorageKey::Owner)
            .ok_or(LobbyError::OwnerNotSet)
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), LobbyError> {
        caller.require_auth();
        let owner = Self::load_owner(env)?;
        if *caller != owner {
            return Err(LobbyError::Unauthorized);
        }
        Ok(())
    }

    fn ensure_not_paused(env: &Env) -> Result<(), LobbyError> {
        let paused: bool = env
            .storage()
            .instance()
            .get(&StorageKey::Paused)
            .unwrap_or(false);
        if paused {
            return Err(LobbyError::Paused);
        }
        Ok(())
    }

    fn ensure_not_blacklisted(env: &Env, address: &Address) -> Result<(), LobbyError> {
        let flagged: bool = env
            .storage()
            .persistent()
            .get(&StorageKey::Blacklist(address.clone()))
            .unwrap_or(false);
        if flagged {
            return Err(LobbyError::Blacklisted);
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Internal: roster & transfers
    // ───────────────────────────────────────────────────────────────────────────

    /// Swap-with-tail removal. The departing participant's slot is taken by
    /// the last roster entry (whose index-map entry is rewritten); all other
    /// positions are untouched. Caller must have verified membership.
    fn remove_participant(lobby: &mut Lobby, participant: &Address) {
        let idx = lobby.participant_index.get(participant.clone()).unwrap();
        let last = lobby.participants.len() - 1;
        if idx != last {
            let tail = lobby.participants.get(last).unwrap();
            lobby.participants.set(idx, tail.clone());
            lobby.participant_index.set(tail, idx);
        }
        lobby.participants.pop_back();
        lobby.participant_index.remove(participant.clone());
    }

    fn token_client(env: &Env) -> token::Client<'_> {
        let token_addr: Address = env
            .storage()
            .instance()
            .get(&StorageKey::Token)
            .unwrap_or_else(|| panic_with_error!(env, LobbyError::OwnerNotSet));
        token::Client::new(env, &token_addr)
    }
}
