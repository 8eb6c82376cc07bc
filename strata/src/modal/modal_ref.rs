//! Per-modal bookkeeping and the handle returned by
//! [`ModalStack::open`](crate::ModalStack::open).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use pagedom::{Document, Signal, Transition};
use tokio::sync::oneshot;

use crate::content::ContentRef;
use crate::host::{ComponentHost, ViewRef};
use crate::modal::{DismissReason, ModalBackdrop, ModalId, ModalWindow};
use crate::options::{BeforeDismiss, DismissCheck, ModalUpdate, WindowOptions};

/// `Ok` with the close value, `Err` with the dismiss reason.
pub type ModalResult<R> = Result<R, DismissReason>;

/// The stack's view of a record, independent of the result type.
pub(crate) trait ModalEntry {
    fn id(&self) -> ModalId;
    fn is_open(&self) -> bool;
    fn dismiss(&self, reason: DismissReason);
}

pub(crate) struct ModalParts {
    pub doc: Document,
    pub host: Rc<dyn ComponentHost>,
    pub window: ModalWindow,
    pub window_view: ViewRef,
    pub backdrop: Option<(ModalBackdrop, ViewRef)>,
    pub content: ContentRef,
    pub before_dismiss: Option<BeforeDismiss>,
}

pub(crate) struct ModalRecord<R> {
    id: ModalId,
    me: Weak<ModalRecord<R>>,
    parts: ModalParts,
    result_tx: RefCell<Option<oneshot::Sender<ModalResult<R>>>>,
    result_rx: RefCell<Option<oneshot::Receiver<ModalResult<R>>>>,
    closed: Signal<()>,
    dismissed: Signal<DismissReason>,
    hidden: Signal<()>,
    /// Emits once the result is known, whichever way.
    settled: Signal<()>,
}

impl<R: 'static> ModalRecord<R> {
    pub(crate) fn new(parts: ModalParts) -> Rc<Self> {
        let (tx, rx) = oneshot::channel();
        let record = Rc::new_cyclic(|me| Self {
            id: ModalId::new(),
            me: me.clone(),
            parts,
            result_tx: RefCell::new(Some(tx)),
            result_rx: RefCell::new(Some(rx)),
            closed: Signal::once(),
            dismissed: Signal::once(),
            hidden: Signal::once(),
            settled: Signal::once(),
        });

        let weak = Rc::downgrade(&record);
        record
            .parts
            .window
            .dismiss_event()
            .subscribe(move |reason| {
                if let Some(record) = weak.upgrade() {
                    record.dismiss(reason.clone());
                }
            })
            .detach();
        record
    }

    pub(crate) fn id(&self) -> ModalId {
        self.id
    }

    pub(crate) fn window(&self) -> &ModalWindow {
        &self.parts.window
    }

    pub(crate) fn hidden(&self) -> Signal<()> {
        self.hidden.clone()
    }

    pub(crate) fn settled(&self) -> Signal<()> {
        self.settled.clone()
    }

    pub(crate) fn is_open(&self) -> bool {
        self.result_tx.borrow().is_some()
    }

    fn take_sender(&self) -> Option<oneshot::Sender<ModalResult<R>>> {
        self.result_tx.borrow_mut().take()
    }

    /// Settle with `result`. Never vetoed.
    pub(crate) fn close(&self, result: R) {
        let Some(tx) = self.take_sender() else {
            log::warn!("close on modal {} ignored: already settled", self.id);
            return;
        };
        log::info!("modal {} closed", self.id);
        self.closed.emit(&());
        self.dismissed.complete();
        let _ = tx.send(Ok(result));
        self.settled.emit(&());
        self.remove_modal_elements();
    }

    /// Ask the `before_dismiss` predicate, then settle with `reason`.
    pub(crate) fn dismiss(&self, reason: DismissReason) {
        if !self.is_open() {
            log::debug!("dismiss on modal {} ignored: already settled", self.id);
            return;
        }
        let Some(predicate) = self.parts.before_dismiss.clone() else {
            self.dismiss_now(reason);
            return;
        };
        match predicate() {
            DismissCheck::Allow => self.dismiss_now(reason),
            DismissCheck::Veto => log::warn!("dismissal of modal {} ({reason}) vetoed", self.id),
            DismissCheck::Deferred(decision) => {
                let id = self.id;
                let me = self.me.clone();
                self.parts.doc.event_loop().spawn_local(async move {
                    if !decision.await {
                        log::warn!("dismissal of modal {id} ({reason}) vetoed");
                        return;
                    }
                    if let Some(record) = me.upgrade() {
                        record.dismiss_now(reason);
                    }
                });
            }
        }
    }

    fn dismiss_now(&self, reason: DismissReason) {
        let Some(tx) = self.take_sender() else {
            return;
        };
        log::info!("modal {} dismissed: {reason}", self.id);
        self.dismissed.emit(&reason);
        self.closed.complete();
        let _ = tx.send(Err(reason));
        self.settled.emit(&());
        self.remove_modal_elements();
    }

    pub(crate) fn update(&self, update: &ModalUpdate) {
        if !self.is_open() {
            log::warn!("update on modal {} ignored: already settled", self.id);
            return;
        }
        self.parts.window.update_options(&WindowOptions::from(update));
        if let (Some((backdrop, _)), Some(class)) = (&self.parts.backdrop, &update.backdrop_class) {
            backdrop.set_backdrop_class(class.clone());
        }
    }

    /// Hide window and backdrop together. Each element leaves the page as
    /// soon as its own transition is over; `hidden` fires after both.
    fn remove_modal_elements(&self) {
        let parts = &self.parts;
        let doc = parts.doc.downgrade();
        let host = Rc::downgrade(&parts.host);

        let window_host = parts.window.host();
        let views: Vec<ViewRef> = std::iter::once(parts.window_view.clone())
            .chain(parts.content.view.clone())
            .collect();
        let window_hidden = parts.window.hide();
        {
            let doc = doc.clone();
            let host = host.clone();
            window_hidden.on_settled(move |_| {
                if let Some(doc) = doc.upgrade() {
                    doc.remove(window_host);
                }
                if let Some(host) = host.upgrade() {
                    for view in &views {
                        host.unmount(view);
                    }
                }
            });
        }

        let all_hidden = match &parts.backdrop {
            Some((backdrop, view)) => {
                let backdrop_host = backdrop.host();
                let view = view.clone();
                let backdrop_hidden = backdrop.hide();
                backdrop_hidden.on_settled(move |_| {
                    if let Some(doc) = doc.upgrade() {
                        doc.remove(backdrop_host);
                    }
                    if let Some(host) = host.upgrade() {
                        host.unmount(&view);
                    }
                });
                Transition::join(&window_hidden, &backdrop_hidden)
            }
            None => window_hidden,
        };

        let hidden = self.hidden.clone();
        let id = self.id;
        all_hidden.on_settled(move |_| {
            log::debug!("modal {id} hidden");
            hidden.emit(&());
        });
    }
}

impl<R: 'static> ModalEntry for ModalRecord<R> {
    fn id(&self) -> ModalId {
        self.id
    }

    fn is_open(&self) -> bool {
        ModalRecord::is_open(self)
    }

    fn dismiss(&self, reason: DismissReason) {
        ModalRecord::dismiss(self, reason);
    }
}

/// Handle to an opened modal.
pub struct ModalRef<R> {
    record: Rc<ModalRecord<R>>,
}

impl<R> Clone for ModalRef<R> {
    fn clone(&self) -> Self {
        Self {
            record: Rc::clone(&self.record),
        }
    }
}

impl<R> fmt::Debug for ModalRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRef")
            .field("id", &self.record.id)
            .field("open", &self.record.result_tx.borrow().is_some())
            .finish()
    }
}

impl<R: 'static> ModalRef<R> {
    pub(crate) fn new(record: Rc<ModalRecord<R>>) -> Self {
        Self { record }
    }

    pub fn id(&self) -> ModalId {
        self.record.id
    }

    /// The outcome of the modal. Can be taken once; later calls return
    /// `None`. Resolves to `Err(DismissReason::Abandoned)` if the modal goes
    /// away without settling.
    pub fn result(&self) -> Option<LocalBoxFuture<'static, ModalResult<R>>> {
        let rx = self.record.result_rx.borrow_mut().take()?;
        Some(
            async move { rx.await.unwrap_or(Err(DismissReason::Abandoned)) }.boxed_local(),
        )
    }

    pub fn close(&self, result: R) {
        self.record.close(result);
    }

    pub fn dismiss(&self, reason: impl Into<DismissReason>) {
        self.record.dismiss(reason.into());
    }

    pub fn update(&self, update: ModalUpdate) {
        self.record.update(&update);
    }

    pub fn is_open(&self) -> bool {
        self.record.is_open()
    }

    /// Emits once the open transitions have finished.
    pub fn shown(&self) -> Signal<()> {
        self.record.window().shown()
    }

    /// Emits once window and backdrop are gone.
    pub fn hidden(&self) -> Signal<()> {
        self.record.hidden()
    }

    pub fn closed(&self) -> Signal<()> {
        self.record.closed.clone()
    }

    pub fn dismissed(&self) -> Signal<DismissReason> {
        self.record.dismissed.clone()
    }

    pub fn window(&self) -> &ModalWindow {
        self.record.window()
    }

    /// `None` when opened with [`BackdropMode::Disabled`](crate::BackdropMode::Disabled).
    pub fn backdrop(&self) -> Option<&ModalBackdrop> {
        self.record.parts.backdrop.as_ref().map(|(backdrop, _)| backdrop)
    }
}

/// Type-erased entry of [`ModalStack::active_instances`](crate::ModalStack::active_instances).
#[derive(Clone)]
pub struct OpenModal {
    entry: Rc<dyn ModalEntry>,
}

impl fmt::Debug for OpenModal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenModal")
            .field("id", &self.entry.id())
            .field("open", &self.entry.is_open())
            .finish()
    }
}

impl OpenModal {
    pub(crate) fn new(entry: Rc<dyn ModalEntry>) -> Self {
        Self { entry }
    }

    pub fn id(&self) -> ModalId {
        self.entry.id()
    }

    pub fn is_open(&self) -> bool {
        self.entry.is_open()
    }

    pub fn dismiss(&self, reason: impl Into<DismissReason>) {
        self.entry.dismiss(reason.into());
    }
}
