use crate::{
    buffer::Buffer,
    error::WireError,
    id::RdId,
    reactive::{ReactiveCore, read_core, write_core},
    serialization::{Codec, RdSerializable, SerializationCtx},
};
use std::{cell::RefCell, marker::PhantomData, rc::Rc};

///
/// RdCall
///
/// Issuing side of a task. Requests are framed as the call's id followed by
/// the request value.
///

pub struct RdCall<Req, Res, ReqC, ResC> {
    core: ReactiveCore,
    codec: PhantomData<(Req, Res, ReqC, ResC)>,
}

reactive_node!([Req, Res, ReqC, ResC] RdCall<Req, Res, ReqC, ResC>);

impl<Req, Res, ReqC, ResC> Default for RdCall<Req, Res, ReqC, ResC> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            codec: PhantomData,
        }
    }
}

impl<Req, Res, ReqC, ResC> RdCall<Req, Res, ReqC, ResC>
where
    ReqC: Codec<Value = Req>,
    ResC: Codec<Value = Res>,
{
    pub fn encode_request(&self, ctx: &SerializationCtx, request: &Req) -> Result<Buffer, WireError> {
        let mut buffer = Buffer::new();
        write_core(&self.core, &mut buffer);
        ReqC::write(ctx, &mut buffer, request)?;

        Ok(buffer)
    }

    pub fn decode_response(&self, ctx: &SerializationCtx, buffer: &mut Buffer) -> Result<Res, WireError> {
        ResC::read(ctx, buffer)
    }
}

///
/// RdEndpoint
///
/// Handling side of a task.
///

pub struct RdEndpoint<Req, Res, ReqC, ResC> {
    core: ReactiveCore,
    handler: RefCell<Option<Rc<dyn Fn(&Req) -> Res>>>,
    codec: PhantomData<(ReqC, ResC)>,
}

reactive_node!([Req, Res, ReqC, ResC] RdEndpoint<Req, Res, ReqC, ResC>);

impl<Req, Res, ReqC, ResC> Default for RdEndpoint<Req, Res, ReqC, ResC> {
    fn default() -> Self {
        Self {
            core: ReactiveCore::default(),
            handler: RefCell::new(None),
            codec: PhantomData,
        }
    }
}

impl<Req, Res, ReqC, ResC> RdEndpoint<Req, Res, ReqC, ResC> {
    pub fn set(&self, handler: impl Fn(&Req) -> Res + 'static) {
        self.handler.replace(Some(Rc::new(handler)));
    }

    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.borrow().is_some()
    }
}

impl<Req, Res, ReqC, ResC> RdEndpoint<Req, Res, ReqC, ResC>
where
    ReqC: Codec<Value = Req>,
    ResC: Codec<Value = Res>,
{
    /// Decode a request addressed to this endpoint and encode the response.
    /// Returns `None` when the request is for another id or no handler is set.
    pub fn handle(
        &self,
        ctx: &SerializationCtx,
        request: &mut Buffer,
    ) -> Result<Option<Buffer>, WireError> {
        let target = RdId::read(request)?;
        if target != self.core.base.rdid() {
            return Ok(None);
        }

        let Some(handler) = self.handler.borrow().clone() else {
            return Ok(None);
        };
        let value = ReqC::read(ctx, request)?;

        let mut response = Buffer::new();
        ResC::write(ctx, &mut response, &handler(&value))?;

        Ok(Some(response))
    }
}

// tasks carry only their id
macro_rules! task_wire {
    ($ty:ident) => {
        impl<Req, Res, ReqC, ResC> RdSerializable for $ty<Req, Res, ReqC, ResC>
        where
            ReqC: Codec<Value = Req>,
            ResC: Codec<Value = Res>,
        {
            fn read(_: &SerializationCtx, buffer: &mut Buffer) -> Result<Self, WireError> {
                Ok(Self {
                    core: read_core(buffer)?,
                    ..Self::default()
                })
            }

            fn write(&self, _: &SerializationCtx, buffer: &mut Buffer) -> Result<(), WireError> {
                write_core(&self.core, buffer);
                Ok(())
            }
        }
    };
}

task_wire!(RdCall);
task_wire!(RdEndpoint);

///
/// TESTS
///
