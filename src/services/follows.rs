use crate::error::{AppError, FollowErrorCode};
use crate::models::{Member, MemberSummary};
use crate::state::AppState;
use crate::store::{FollowRepository, MemberRepository};

pub async fn follow(state: &AppState, follower: &Member, username: &str) -> Result<(), AppError> {
    let followee = target(state, username).await?;
    if followee.id == follower.id {
        return Err(FollowErrorCode::CanNotFollowMyself.into());
    }
    if !state.store.add_follow(follower.id, followee.id).await? {
        return Err(FollowErrorCode::AlreadyFollowing.into());
    }

    log::info!("{} followed {}", follower.username, followee.username);
    Ok(())
}

pub async fn unfollow(
    state: &AppState,
    follower: &Member,
    username: &str,
) -> Result<(), AppError> {
    let followee = target(state, username).await?;
    if !state.store.remove_follow(follower.id, followee.id).await? {
        return Err(FollowErrorCode::NotFollowing.into());
    }

    log::info!("{} unfollowed {}", follower.username, followee.username);
    Ok(())
}

pub async fn followers(state: &AppState, member: &Member) -> Result<Vec<MemberSummary>, AppError> {
    state.store.followers(member.id).await
}

pub async fn followings(
    state: &AppState,
    member: &Member,
) -> Result<Vec<MemberSummary>, AppError> {
    state.store.followings(member.id).await
}

async fn target(state: &AppState, username: &str) -> Result<Member, AppError> {
    state
        .store
        .find_member_by_username(username)
        .await?
        .ok_or_else(|| FollowErrorCode::NotFoundMember.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[actix_rt::test]
    async fn test_cannot_follow_myself() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;

        let err = follow(&state, &alice, "alice").await.unwrap_err();
        assert_eq!(err.code(), "400-3");
        assert!(followings(&state, &alice).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_follow_twice_is_rejected() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        testing::member(&state, "bob").await;

        follow(&state, &alice, "bob").await.unwrap();
        let err = follow(&state, &alice, "bob").await.unwrap_err();
        assert_eq!(err.code(), "400-2");
    }

    #[actix_rt::test]
    async fn test_follow_lists_both_directions() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        let bob = testing::member(&state, "bob").await;

        follow(&state, &alice, "bob").await.unwrap();

        let summaries = followings(&state, &alice).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].username, "bob");
        assert_eq!(summaries[0].nickname, "bob-nick");

        let summaries = followers(&state, &bob).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].username, "alice");
    }

    #[actix_rt::test]
    async fn test_unfollow() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        testing::member(&state, "bob").await;

        assert_eq!(
            unfollow(&state, &alice, "bob").await.unwrap_err().code(),
            "400-1"
        );
        follow(&state, &alice, "bob").await.unwrap();
        unfollow(&state, &alice, "bob").await.unwrap();
        assert!(followings(&state, &alice).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_unknown_member() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;

        assert_eq!(
            follow(&state, &alice, "nobody").await.unwrap_err().code(),
            "404-1"
        );
        assert_eq!(
            unfollow(&state, &alice, "nobody").await.unwrap_err().code(),
            "404-1"
        );
    }
}
