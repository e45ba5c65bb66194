// Two security tiers:
// public (no session: service info, health, identity-provider webhooks)
// protected (session required: journal, goals, status types)
pub mod protected;
pub mod public;
