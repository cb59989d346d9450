//! Request / success / failure creators around an async call
//!
//! [`Registry::create_action_async`] allocates `<DESC>_REQUEST`, `<DESC>_OK`
//! and `<DESC>_ERROR` creators and keeps the async function they describe.
//! [`AsyncAction::run`] dispatches the request, awaits the call and then
//! dispatches either the success or the error action. No runtime is assumed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::Serialize;

use crate::action::ActionType;
use crate::creator::ActionCreator;
use crate::error::Result;
use crate::registry::Registry;
use crate::target::Target;

type AsyncApi<A, T, E> = Rc<dyn Fn(A) -> Pin<Box<dyn Future<Output = std::result::Result<T, E>>>>>;

/// Three creators tracking the lifecycle of one async call
pub struct AsyncAction<A, T, E> {
    pub request: ActionCreator<A>,
    pub ok: ActionCreator<T>,
    pub error: ActionCreator<E>,
    api: AsyncApi<A, T, E>,
}

impl<A, T, E> Clone for AsyncAction<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            ok: self.ok.clone(),
            error: self.error.clone(),
            api: self.api.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for AsyncAction<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAction")
            .field("request", &self.request.action_type())
            .field("ok", &self.ok.action_type())
            .field("error", &self.error.action_type())
            .finish()
    }
}

impl<A, T, E> AsyncAction<A, T, E> {
    /// Dispatch the request, await the call, then dispatch its outcome.
    ///
    /// The error action is flagged with `error = true`. The call's result is
    /// returned unchanged.
    pub async fn run(&self, args: A, target: impl Into<Target>) -> std::result::Result<T, E> {
        let target = target.into();
        target.send(self.request.build(&args));

        let result = (self.api)(args).await;
        match &result {
            Ok(value) => {
                target.send(self.ok.build(value));
            }
            Err(err) => {
                let mut action = self.error.build(err);
                action.error = true;
                tracing::debug!(action_type = %action.kind, "async call failed");
                target.send(action);
            }
        }
        result
    }
}

impl Registry {
    /// Build the creators for an async call named `description`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateType`](crate::Error::DuplicateType) when one of the
    /// three derived types is serializable and already issued.
    pub fn create_action_async<A, T, E, F, Fut>(
        &self,
        description: &str,
        api: F,
    ) -> Result<AsyncAction<A, T, E>>
    where
        A: Serialize + 'static,
        T: Serialize + 'static,
        E: Serialize + 'static,
        F: Fn(A) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + 'static,
    {
        let [request, ok, error] =
            ["REQUEST", "OK", "ERROR"].map(|suffix| format!("{description}_{suffix}"));
        // Nothing is issued unless all three names are free.
        for name in [&request, &ok, &error] {
            if ActionType::is_serializable(name) {
                self.types().check(name)?;
            }
        }
        let request = self.create_action::<A>(&request)?;
        let ok = self.create_action::<T>(&ok)?;
        let error = self.create_action::<E>(&error)?;

        let api: AsyncApi<A, T, E> = Rc::new(move |args: A| {
            let call: Pin<Box<dyn Future<Output = std::result::Result<T, E>>>> =
                Box::pin(api(args));
            call
        });

        Ok(AsyncAction {
            request,
            ok,
            error,
            api,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTarget;
    use crate::{Reducer, Store};
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct User {
        id: u32,
    }

    #[test]
    fn test_creates_three_types() {
        let registry = Registry::new();
        let login = registry
            .create_action_async("LOGIN_1", |_: ()| async { Ok::<_, String>(()) })
            .unwrap();

        assert_eq!(login.request.to_string(), "LOGIN_1_REQUEST");
        assert_eq!(login.ok.to_string(), "LOGIN_1_OK");
        assert_eq!(login.error.to_string(), "LOGIN_1_ERROR");
    }

    #[test]
    fn test_duplicate_async_name() {
        let registry = Registry::new();
        registry
            .create_action_async("FETCH", |_: ()| async { Ok::<_, String>(()) })
            .unwrap();
        assert!(registry
            .create_action_async("FETCH", |_: ()| async { Ok::<_, String>(()) })
            .is_err());
    }

    #[test]
    fn test_collision_issues_nothing() {
        let registry = Registry::new();
        registry.create_action::<()>("FETCH_OK").unwrap();

        let err = registry
            .create_action_async("FETCH", |_: ()| async { Ok::<_, String>(()) })
            .unwrap_err();
        assert_eq!(err, crate::Error::DuplicateType("FETCH_OK".into()));
        assert!(!registry.types().has("FETCH_REQUEST"));
        assert!(!registry.types().has("FETCH_ERROR"));

        registry.types().remove("FETCH_OK");
        assert!(registry
            .create_action_async("FETCH", |_: ()| async { Ok::<_, String>(()) })
            .is_ok());
    }

    #[tokio::test]
    async fn test_run_ok() {
        let registry = Registry::new();
        let login = registry
            .create_action_async("LOGIN_2", |name: String| async move {
                Ok::<_, String>(User {
                    id: name.len() as u32,
                })
            })
            .unwrap();
        let recorder = RecordingTarget::new();

        let user = login.run("lolo".to_string(), &recorder).await.unwrap();
        assert_eq!(user, User { id: 4 });

        let actions = recorder.actions();
        assert_eq!(recorder.types(), vec!["LOGIN_2_REQUEST", "LOGIN_2_OK"]);
        assert_eq!(actions[0].payload, json!("lolo"));
        assert_eq!(actions[1].payload, json!({ "id": 4 }));
        assert!(!actions[1].error);
    }

    #[tokio::test]
    async fn test_run_error() {
        let registry = Registry::new();
        let login = registry
            .create_action_async("LOGIN_3", |_: ()| async {
                Err::<User, _>(json!({ "name": "myError" }))
            })
            .unwrap();
        let recorder = RecordingTarget::new();

        let err = login.run((), &recorder).await.unwrap_err();
        assert_eq!(err, json!({ "name": "myError" }));

        let actions = recorder.actions();
        assert_eq!(recorder.types(), vec!["LOGIN_3_REQUEST", "LOGIN_3_ERROR"]);
        assert!(actions[1].error);
        assert_eq!(actions[1].payload, json!({ "name": "myError" }));
    }

    #[tokio::test]
    async fn test_run_drives_reducer() {
        let registry = Registry::new();
        let load = registry
            .create_action_async("LOAD", |n: i64| async move { Ok::<_, String>(n * 2) })
            .unwrap();

        let reducer = Reducer::new(json!({ "loading": false, "value": 0 }));
        reducer
            .on(&load.request, |_, _, _| json!({ "loading": true, "value": 0 }))
            .on(&load.ok, |_, payload: &Value, _| {
                json!({ "loading": false, "value": payload })
            });
        let store = Store::from_reducer(reducer);

        load.run(21, &store).await.unwrap();
        assert_eq!(store.state(), json!({ "loading": false, "value": 42 }));
    }
}
