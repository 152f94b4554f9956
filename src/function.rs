use core::fmt;
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::interfaces::container::{Container, ServiceName};
use crate::interfaces::provider::Provider;

/// A type that knows how to build itself from a container.
///
/// Usually derived with `#[derive(Injectable)]`.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn inject(container: &dyn Container) -> anyhow::Result<Self>;
}

/// Provider building `T` through [`Injectable::inject`].
pub fn service<T: Injectable>() -> Provider {
    Provider::new(T::inject)
}

/// A function taking its dependencies positionally, as `Arc`s.
///
/// Implemented for every `Fn(Arc<A>, Arc<B>, ...) -> T` of up to eight
/// arguments.
pub trait ServiceFactory<Args>: Send + Sync + 'static {
    type Output: Any + Send + Sync;

    const ARITY: usize;

    fn invoke(&self, container: &dyn Container, deps: &[ServiceName]) -> anyhow::Result<Self::Output>;
}

/// Provider calling `func` with the services named in `deps`, in order.
///
/// ```rust
/// use std::sync::Arc;
/// use bottle::{service_factory, Bottle, Provider, Providers};
///
/// struct Water;
/// struct Hops {
///     water: Arc<Water>,
/// }
///
/// impl Hops {
///     fn new(water: Arc<Water>) -> Self {
///         Hops { water }
///     }
/// }
///
/// let bottle = Bottle::new(
///     Providers::new()
///         .with("water", Provider::from_fn(|_| Water))
///         .with("hops", service_factory(Hops::new, ["water"])),
/// );
///
/// let hops = bottle.get::<Hops>("hops").unwrap();
/// assert!(Arc::ptr_eq(&hops.water, &bottle.get::<Water>("water").unwrap()));
/// ```
pub fn service_factory<F, Args, N>(func: F, deps: N) -> Provider
where
    F: ServiceFactory<Args>,
    Args: 'static,
    N: IntoIterator,
    N::Item: Into<ServiceName>,
{
    Function::new(func, deps).into()
}

pub struct Function<F, Args> {
    func: F,
    deps: Vec<ServiceName>,
    _marker: PhantomData<fn(Args)>,
}

impl<F, Args> Function<F, Args>
where
    F: ServiceFactory<Args>,
{
    pub fn new<N>(func: F, deps: N) -> Self
    where
        N: IntoIterator,
        N::Item: Into<ServiceName>,
    {
        Self {
            func,
            deps: deps.into_iter().map(Into::into).collect(),
            _marker: PhantomData,
        }
    }

    pub fn deps(&self) -> &[ServiceName] {
        &self.deps
    }

    pub fn call(&self, container: &dyn Container) -> anyhow::Result<F::Output> {
        if self.deps.len() != F::ARITY {
            anyhow::bail!(
                "{} takes {} dependencies but {} were named",
                type_name::<F>(),
                F::ARITY,
                self.deps.len()
            );
        }
        self.func.invoke(container, &self.deps)
    }
}

impl<F, Args> fmt::Debug for Function<F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("f", &format_args!("{}", type_name::<F>()))
            .field("deps", &self.deps)
            .finish()
    }
}

impl<F, Args> From<Function<F, Args>> for Provider
where
    F: ServiceFactory<Args>,
    Args: 'static,
{
    fn from(function: Function<F, Args>) -> Self {
        Provider::new(move |container| function.call(container))
    }
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_service_factory {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> ServiceFactory<($($arg,)*)> for Func
        where
            Func: Fn($(Arc<$arg>),*) -> Out + Send + Sync + 'static,
            Out: Any + Send + Sync,
            $($arg: Any + Send + Sync,)*
        {
            type Output = Out;

            const ARITY: usize = count!($($arg)*);

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn invoke(&self, container: &dyn Container, deps: &[ServiceName]) -> anyhow::Result<Out> {
                let mut deps = deps.iter();
                $(
                    let name = deps
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("missing dependency name"))?;
                    let $arg = container.get::<$arg>(name)?;
                )*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_service_factory!();
impl_service_factory!(A1);
impl_service_factory!(A1, A2);
impl_service_factory!(A1, A2, A3);
impl_service_factory!(A1, A2, A3, A4);
impl_service_factory!(A1, A2, A3, A4, A5);
impl_service_factory!(A1, A2, A3, A4, A5, A6);
impl_service_factory!(A1, A2, A3, A4, A5, A6, A7);
impl_service_factory!(A1, A2, A3, A4, A5, A6, A7, A8);
