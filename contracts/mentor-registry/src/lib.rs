#![no_std]

//! # Mentor Registry
//!
//! On-chain per-mentor session tracking for the Mentora platform.
//! Called by authorized lobby contracts (or the admin) when a session
//! completes, accumulating completion counts, earnings, and participant
//! totals per mentor.
//!
//! ## Features
//! - Sessions-completed / earnings / participants-served counters
//! - Authorized-caller list so only real lobby contracts can report
//! - Per-mentor stats query and registered-mentor count
//! - Event emission for indexing

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype,
    panic_with_error, Address, Env, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MentorStats {
    pub address: Address,
    pub sessions_completed: u32,
    pub total_earned: i128,
    pub participants_served: u32,
    pub last_session: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    /// Set of authorized lobby contracts that can report sessions
    AuthorizedLobbies,
    /// Mentor stats: DataKey::Mentor(address) → MentorStats
    Mentor(Address),
    /// All mentors ever recorded (registration order)
    AllMentors,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    NotAdmin = 1,
    NotAuthorized = 2,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvSessionRecorded {
    pub mentor: Address,
    pub lobby_id: u32,
    pub participants: u32,
    pub amount_paid: i128,
}

#[contractevent]
pub struct EvMentorRegistered {
    pub mentor: Address,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// TTL expressed in human-readable time units (120 days)
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60; // 10,368,000 seconds

/// TTL for mentor data in ledgers: 120 * 24 * 60 * 60 / 5 = 2,073,600 ledgers
const TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct MentorRegistry;

#[contractimpl]
impl MentorRegistry {
    /// Initialize with admin address
    pub fn __constructor(env: Env, admin: Address) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        let empty_lobbies: Vec<Address> = Vec::new(&env);
        env.storage()
            .instance()
            .set(&DataKey::AuthorizedLobbies, &empty_lobbies);
        let empty_mentors: Vec<Address> = Vec::new(&env);
        env.storage().instance().set(&DataKey::AllMentors, &empty_mentors);
    }

    /// Add a lobby contract address that's allowed to report sessions
    pub fn authorize_lobby(env: Env, caller: Address, lobby_contract: Address) {
        caller.require_auth();
        let admin: Address = env.storage().instance().get(&DataKey::Admin).unwrap();
        if caller != admin {
            panic_with_error!(&env, RegistryError::NotAdmin);
        }
        let mut lobbies: Vec<Address> = env
            .storage()
            .instance()
            .get(&DataKey::AuthorizedLobbies)
            .unwrap_or(Vec::new(&env));
        if !lobbies.contains(&lobby_contract) {
            lobbies.push_back(lobby_contract);
            env.storage()
                .instance()
                .set(&DataKey::AuthorizedLobbies, &lobbies);
        }
    }

    /// Record a completed session. Called by an authorized lobby contract
    /// or the admin. `amount_paid` is the mentor's payout net of fees.
    pub fn record_session(
        env: Env,
        caller: Address,
        mentor: Address,
        lobby_id: u32,
        participants: u32,
        amount_paid: i128,
    ) {
        caller.require_auth();

        // Verify caller is admin or an authorized lobby contract
        let admin: Address = env.storage().instance().get(&DataKey::Admin).unwrap();
        if caller != admin {
            let lobbies: Vec<Address> = env
                .storage()
                .instance()
                .get(&DataKey::AuthorizedLobbies)
                .unwrap_or(Vec::new(&env));
            if !lobbies.contains(&caller) {
                panic_with_error!(&env, RegistryError::NotAuthorized);
            }
        }

        let now = env.ledger().timestamp();

        let mut stats = Self::get_or_create_stats(&env, &mentor, now);
        stats.sessions_completed += 1;
        stats.total_earned += amount_paid;
        stats.participants_served += participants;
        stats.last_session = now;
        Self::save_stats(&env, &stats);

        EvSessionRecorded {
            mentor,
            lobby_id,
            participants,
            amount_paid,
        }
        .publish(&env);
    }

    /// Get stats for a mentor. Returns None if never recorded.
    pub fn get_mentor(env: Env, mentor: Address) -> Option<MentorStats> {
        env.storage().persistent().get(&DataKey::Mentor(mentor))
    }

    /// Total number of mentors with at least one recorded session
    pub fn total_mentors(env: Env) -> u32 {
        let all: Vec<Address> = env
            .storage()
            .instance()
            .get(&DataKey::AllMentors)
            .unwrap_or(Vec::new(&env));
        all.len()
    }

    // ─── Internal helpers ──────────────────────────────────────────────────

    fn get_or_create_stats(env: &Env, mentor: &Address, now: u64) -> MentorStats {
        match env
            .storage()
            .persistent()
            .get::<DataKey, MentorStats>(&DataKey::Mentor(mentor.clone()))
        {
            Some(stats) => stats,
            None => {
                let mut all: Vec<Address> = env
                    .storage()
                    .instance()
                    .get(&DataKey::AllMentors)
                    .unwrap_or(Vec::new(env));
                all.push_back(mentor.clone());
                env.storage().instance().set(&DataKey::AllMentors, &all);

                EvMentorRegistered {
                    mentor: mentor.clone(),
                }
                .publish(env);

                MentorStats {
                    address: mentor.clone(),
                    sessions_completed: 0,
                    total_earned: 0,
                    participants_served: 0,
                    last_session: now,
                }
            }
        }
    }

    fn save_stats(env: &Env, stats: &MentorStats) {
        env.storage()
            .persistent()
            .set(&DataKey::Mentor(stats.address.clone()), stats);
        env.storage().persistent().extend_ttl(
            &DataKey::Mentor(stats.address.clone()),
            TTL_LEDGERS,
            TTL_LEDGERS,
        );
    }
}
