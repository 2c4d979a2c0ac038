use model::entities::user;

/// Caller identity with the role made explicit.
///
/// Coach-only operations (publishing, detaching, deleting) and
/// participant-only operations (enrolling, unenrolling) dispatch on the
/// variant instead of re-checking a boolean flag at every branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Coach { id: i32 },
    Participant { id: i32 },
}

impl Actor {
    pub fn from_user(user: &user::Model) -> Self {
        if user.is_coach {
            Actor::Coach { id: user.id }
        } else {
            Actor::Participant { id: user.id }
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Actor::Coach { id } | Actor::Participant { id } => id,
        }
    }
}
