//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, AnalyticsQuery, AuditLogRepository, AuthCommand, CredentialHasher,
    DemoAccountSeeding, MediaAssetRepository, MessageCommand, MessageQuery, MessageRepository,
    ObjectStore, RoleRepository, StaffInvitation, StaffQuery, TicketCommand, TicketQuery,
    TicketRepository,
};
use crate::domain::{
    AccountService, Actor, AnalyticsService, DemoAccountSeeder, Error, MessageService,
    StaffDirectory, StaffInvitationService, TicketService,
};

use super::session::SessionContext;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub messages: Arc<dyn MessageCommand>,
    pub messages_query: Arc<dyn MessageQuery>,
    pub analytics: Arc<dyn AnalyticsQuery>,
    pub staff: Arc<dyn StaffQuery>,
    pub invitations: Arc<dyn StaffInvitation>,
    pub demo_accounts: Arc<dyn DemoAccountSeeding>,
}

/// Driven adapters the domain services are assembled from.
pub struct Adapters<A, R, T, M, MA, L, O, H> {
    pub accounts: Arc<A>,
    pub roles: Arc<R>,
    pub tickets: Arc<T>,
    pub messages: Arc<M>,
    pub assets: Arc<MA>,
    pub audit: Arc<L>,
    pub objects: Arc<O>,
    pub hasher: Arc<H>,
}

impl HttpStatePorts {
    /// Assemble every domain service over one set of driven adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use helpdesk::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
    /// use helpdesk::outbound::crypto::Argon2CredentialHasher;
    /// use helpdesk::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let ports = HttpStatePorts::from_adapters(
    ///     Adapters {
    ///         accounts: store.clone(),
    ///         roles: store.clone(),
    ///         tickets: store.clone(),
    ///         messages: store.clone(),
    ///         assets: store.clone(),
    ///         audit: store.clone(),
    ///         objects: store,
    ///         hasher: Arc::new(Argon2CredentialHasher::default()),
    ///     },
    ///     Arc::new(mockable::DefaultClock),
    /// );
    /// let _state = HttpState::new(ports);
    /// ```
    pub fn from_adapters<A, R, T, M, MA, L, O, H>(
        adapters: Adapters<A, R, T, M, MA, L, O, H>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        A: AccountRepository + 'static,
        R: RoleRepository + 'static,
        T: TicketRepository + 'static,
        M: MessageRepository + 'static,
        MA: MediaAssetRepository + 'static,
        L: AuditLogRepository + 'static,
        O: ObjectStore + 'static,
        H: CredentialHasher + 'static,
    {
        let Adapters {
            accounts,
            roles,
            tickets,
            messages,
            assets,
            audit,
            objects,
            hasher,
        } = adapters;

        let ticket_service = Arc::new(TicketService::new(tickets.clone(), clock.clone()));
        let message_service = Arc::new(MessageService::new(
            tickets.clone(),
            messages.clone(),
            assets,
            objects,
            clock.clone(),
        ));
        Self {
            auth: Arc::new(AccountService::new(
                accounts.clone(),
                roles.clone(),
                hasher.clone(),
                clock.clone(),
            )),
            tickets: ticket_service.clone(),
            tickets_query: ticket_service,
            messages: message_service.clone(),
            messages_query: message_service,
            analytics: Arc::new(AnalyticsService::new(
                tickets,
                messages,
                accounts.clone(),
                clock.clone(),
            )),
            staff: Arc::new(StaffDirectory::new(accounts.clone())),
            invitations: Arc::new(StaffInvitationService::new(
                accounts.clone(),
                roles.clone(),
                audit.clone(),
                hasher.clone(),
                clock.clone(),
            )),
            demo_accounts: Arc::new(DemoAccountSeeder::new(accounts, roles, audit, hasher, clock)),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub messages: Arc<dyn MessageCommand>,
    pub messages_query: Arc<dyn MessageQuery>,
    pub analytics: Arc<dyn AnalyticsQuery>,
    pub staff: Arc<dyn StaffQuery>,
    pub invitations: Arc<dyn StaffInvitation>,
    pub demo_accounts: Arc<dyn DemoAccountSeeding>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            auth,
            tickets,
            tickets_query,
            messages,
            messages_query,
            analytics,
            staff,
            invitations,
            demo_accounts,
        } = ports;
        Self {
            auth,
            tickets,
            tickets_query,
            messages,
            messages_query,
            analytics,
            staff,
            invitations,
            demo_accounts,
        }
    }

    /// Resolve the signed-in user and their roles.
    ///
    /// Returns `401` when the session holds no user or the account has gone.
    pub async fn actor(&self, session: &SessionContext) -> Result<Actor, Error> {
        let user_id = session.require_user_id()?;
        self.auth.resolve_actor(&user_id).await
    }
}
