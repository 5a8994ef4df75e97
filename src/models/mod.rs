pub mod book;
pub mod favorite;
pub mod follow;
pub mod member;
pub mod review;

pub use book::{Book, BookDetail, BookInput, BookQuery};
pub use favorite::Favorite;
pub use follow::Follow;
pub use member::{
    Gender, Member, MemberChanges, MemberProfile, MemberSummary, ModifyRequest, NewMember,
    PasswordRequest,
};
pub use review::{
    CommentInput, NewComment, NewReview, Review, ReviewComment, ReviewInput, ReviewUpdate,
};
