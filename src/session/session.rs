use crate::session::{Identity, Token};

/// Pairing of credential and identity held by the running application.
///
/// A token may be present without an identity (after login, before the
/// identity fetch completes). The reverse is never representable: every
/// constructor drops an identity that arrives without a token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<Token>,
    identity: Option<Identity>,
}

impl Session {
    pub fn new(token: Option<Token>, identity: Option<Identity>) -> Self {
        match token {
            Some(token) => Session {
                token: Some(token),
                identity,
            },
            None => Session::anonymous(),
        }
    }

    pub fn anonymous() -> Self {
        Session {
            token: None,
            identity: None,
        }
    }

    pub fn authenticated(token: Token, identity: Identity) -> Self {
        Session {
            token: Some(token),
            identity: Some(identity),
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.identity.is_none()
    }

    // Replace identity only when a token is held.
    pub(crate) fn replace_identity(&mut self, identity: Identity) -> bool {
        if self.token.is_some() {
            self.identity = Some(identity);
            true
        } else {
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.token = None;
        self.identity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn identity_without_token_is_dropped() {
        let identity = Identity::new("admin", Role::Admin).unwrap();
        let session = Session::new(None, Some(identity));
        assert!(session.is_empty());
    }

    #[test]
    fn token_without_identity_is_authenticated() {
        let session = Session::new(Some(Token::new("t")), None);
        assert!(session.is_authenticated());
        assert!(session.identity().is_none());
    }

    #[test]
    fn replace_identity_requires_token() {
        let identity = Identity::new("user", Role::User).unwrap();

        let mut session = Session::anonymous();
        assert!(!session.replace_identity(identity.clone()));
        assert!(session.identity().is_none());

        let mut session = Session::new(Some(Token::new("t")), None);
        assert!(session.replace_identity(identity.clone()));
        assert_eq!(session.identity(), Some(&identity));

        session.clear();
        assert!(session.is_empty());
    }
}
